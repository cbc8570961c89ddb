use crate::comment::repository::CommentRepository;
use crate::engagement::model::{LikeStatus, SaveStatus, UserStats};
use crate::engagement::repository::RelationRepository;
use crate::middleware::auth::Identity;
use crate::post::post_model::{Post, PostView};
use crate::post::post_repository::PostRepository;
use crate::post::post_service::{PostService, find_post_or_404};
use crate::utils::error::CustomError;
use crate::utils::helpers::count_words;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;

pub struct EngagementService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn RelationRepository>,
    saves: Arc<dyn RelationRepository>,
}

impl EngagementService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        likes: Arc<dyn RelationRepository>,
        saves: Arc<dyn RelationRepository>,
    ) -> Self {
        EngagementService {
            posts,
            comments,
            likes,
            saves,
        }
    }

    async fn post(&self, slug: &str) -> Result<Post, CustomError> {
        find_post_or_404(self.posts.as_ref(), slug).await
    }

    /// Flip the user's like. A concurrent duplicate insert counts as liked.
    pub async fn toggle_like(&self, slug: &str, user: &ObjectId) -> Result<LikeStatus, CustomError> {
        let post = self.post(slug).await?;

        let is_liked = if self.likes.remove(&post.id, user).await? {
            false
        } else {
            self.likes.add(&post.id, user).await?;
            true
        };

        Ok(LikeStatus {
            likes_count: self.likes.count_for_post(&post.id).await?,
            is_liked,
        })
    }

    pub async fn like_status(
        &self,
        slug: &str,
        identity: &Identity,
    ) -> Result<LikeStatus, CustomError> {
        let post = self.post(slug).await?;
        let is_liked = match identity.user_id() {
            Some(user) => self.likes.exists(&post.id, &user).await?,
            None => false,
        };
        Ok(LikeStatus {
            likes_count: self.likes.count_for_post(&post.id).await?,
            is_liked,
        })
    }

    /// Flip the user's bookmark. The post's bookmark counter follows best-effort.
    pub async fn toggle_save(&self, slug: &str, user: &ObjectId) -> Result<SaveStatus, CustomError> {
        let post = self.post(slug).await?;

        let (is_saved, delta) = if self.saves.remove(&post.id, user).await? {
            (false, -1)
        } else if self.saves.add(&post.id, user).await? {
            (true, 1)
        } else {
            (true, 0)
        };

        if delta != 0 {
            if let Err(e) = self.posts.adjust_bookmarks(&post.id, delta).await {
                log::warn!("Failed to update bookmark count of post {}: {}", post.id, e);
            }
        }

        Ok(SaveStatus { is_saved })
    }

    pub async fn save_status(
        &self,
        slug: &str,
        identity: &Identity,
    ) -> Result<SaveStatus, CustomError> {
        let post = self.post(slug).await?;
        let is_saved = match identity.user_id() {
            Some(user) => self.saves.exists(&post.id, &user).await?,
            None => false,
        };
        Ok(SaveStatus { is_saved })
    }

    /// Saved posts, most recently saved first. Posts deleted since are skipped.
    pub async fn list_saved_posts(
        &self,
        user: &ObjectId,
        publisher: &PostService,
    ) -> Result<Vec<PostView>, CustomError> {
        let saved = self.saves.list_for_user(user).await?;
        let ids: Vec<ObjectId> = saved.iter().map(|s| s.post).collect();

        let mut by_id: HashMap<ObjectId, Post> = self
            .posts
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let ordered: Vec<Post> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
        publisher.populate(ordered).await
    }

    pub async fn user_stats(&self, user: &ObjectId) -> Result<UserStats, CustomError> {
        let posts = self.posts.list_by_author(user).await?;
        let ids: Vec<ObjectId> = posts.iter().map(|p| p.id).collect();

        Ok(UserStats {
            total_posts: posts.len(),
            total_likes: self.likes.count_for_posts(&ids).await?,
            total_views: posts.iter().map(|p| p.views).sum(),
            total_word_count: posts.iter().map(|p| count_words(&p.content)).sum(),
        })
    }

    /// Drop every like, save and comment the user made.
    pub async fn forget_user(&self, user: &ObjectId) -> Result<(), CustomError> {
        let likes = self.likes.delete_for_user(user).await?;
        let saves = self.saves.delete_for_user(user).await?;
        let comments = self.comments.delete_for_user(user).await?;
        log::info!(
            "Removed {} likes, {} saves and {} comments of user {}",
            likes,
            saves,
            comments,
            user
        );
        Ok(())
    }
}
