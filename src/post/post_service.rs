use crate::comment::repository::CommentRepository;
use crate::engagement::repository::RelationRepository;
use crate::post::post_model::{
    AuthorSummary, CreatePostRequest, Post, PostEdit, PostView, Revision, UpdatePostRequest,
};
use crate::post::post_repository::PostRepository;
use crate::user::repository::UserRepository;
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::helpers::{
    count_words, normalize_hashtags, reading_time_minutes, slugify, strip_html,
};
use crate::utils::validation::{check_length, require};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;

pub const TITLE_MIN_LENGTH: usize = 3;
pub const TITLE_MAX_LENGTH: usize = 150;
pub const SUBTITLE_MAX_LENGTH: usize = 250;
pub const CATEGORY_MIN_LENGTH: usize = 4;
pub const CONTENT_MIN_LENGTH: usize = 10;

pub async fn find_post_or_404(posts: &dyn PostRepository, slug: &str) -> Result<Post, CustomError> {
    posts
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    authors: UserService,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn RelationRepository>,
    saves: Arc<dyn RelationRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
        likes: Arc<dyn RelationRepository>,
        saves: Arc<dyn RelationRepository>,
    ) -> Self {
        PostService {
            posts,
            authors: UserService::new(users.clone()),
            users,
            comments,
            likes,
            saves,
        }
    }

    pub async fn create_post(
        &self,
        author_id: ObjectId,
        request: CreatePostRequest,
    ) -> Result<PostView, CustomError> {
        let title = require("Title", request.title.as_deref())?;
        let category = require("Category", request.category.as_deref())?;
        let content = require("Content", request.content.as_deref())?;
        let subtitle = request.subtitle.as_deref().map(str::trim).unwrap_or_default();

        check_length("Title", title, Some(TITLE_MIN_LENGTH), Some(TITLE_MAX_LENGTH))?;
        check_length("Subtitle", subtitle, None, Some(SUBTITLE_MAX_LENGTH))?;
        check_length("Category", category, Some(CATEGORY_MIN_LENGTH), None)?;
        check_length("Content", content, Some(CONTENT_MIN_LENGTH), None)?;

        let slug = derive_slug(request.slug.as_deref(), title)?;
        if self.posts.find_by_slug(&slug).await?.is_some() {
            return Err(CustomError::ConflictError(format!(
                "A post with slug '{}' already exists",
                slug
            )));
        }

        let now = Utc::now();
        let post = Post {
            id: ObjectId::new(),
            slug,
            author: author_id,
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            category: category.to_string(),
            content: content.to_string(),
            ai_content: request.ai_content.filter(|s| !s.trim().is_empty()),
            header_image: request.header_image,
            hashtags: normalize_hashtags(&request.hashtags),
            visibility: request.visibility.unwrap_or_default(),
            status: request.status.unwrap_or_default(),
            views: 0,
            bookmarks: 0,
            reading_time: reading_time_minutes(content),
            revisions: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.posts.insert(&post).await?;

        // Keep the author's post list in step with the post; undo the insert otherwise.
        let words = count_words(&strip_html(&post.content));
        if let Err(e) = self.authors.record_post(&author_id, &post.id, words).await {
            log::error!(
                "Failed to link post {} to author {}: {}",
                post.id,
                author_id,
                e
            );
            if let Err(rollback) = self.posts.delete(&post.id).await {
                log::error!("Failed to roll back post {}: {}", post.id, rollback);
            }
            return Err(CustomError::InternalServerError(
                "Failed to create post".to_string(),
            ));
        }

        log::info!("Post '{}' created by {}", post.slug, author_id);
        let mut views = self.populate(vec![post]).await?;
        views
            .pop()
            .ok_or_else(|| CustomError::InternalServerError("Failed to create post".into()))
    }

    pub async fn list_posts(&self) -> Result<Vec<PostView>, CustomError> {
        let posts = self.posts.list_all().await?;
        self.populate(posts).await
    }

    /// Fetch one post and count the view.
    pub async fn get_post(&self, slug: &str) -> Result<PostView, CustomError> {
        let post = self
            .posts
            .record_view(slug)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))?;
        let mut views = self.populate(vec![post]).await?;
        views
            .pop()
            .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<PostView>, CustomError> {
        let posts = self.posts.list_by_category(category).await?;
        if posts.is_empty() {
            return Err(CustomError::NotFoundError(format!(
                "No posts found in category '{}'",
                category
            )));
        }
        self.populate(posts).await
    }

    pub async fn list_by_author(&self, author_id: &ObjectId) -> Result<Vec<PostView>, CustomError> {
        let posts = self.posts.list_by_author(author_id).await?;
        self.populate(posts).await
    }

    /// Owner edit. The previous body is kept as a revision; the slug never changes.
    pub async fn update_post(
        &self,
        slug: &str,
        owner: &ObjectId,
        changes: UpdatePostRequest,
    ) -> Result<PostView, CustomError> {
        let post = self.owned_post(slug, owner).await?;
        let mut edit = PostEdit::default();

        if let Some(title) = changes.title {
            let title = title.trim();
            check_length("Title", title, Some(TITLE_MIN_LENGTH), Some(TITLE_MAX_LENGTH))?;
            edit.title = Some(title.to_string());
        }
        if let Some(subtitle) = changes.subtitle {
            let subtitle = subtitle.trim();
            check_length("Subtitle", subtitle, None, Some(SUBTITLE_MAX_LENGTH))?;
            edit.subtitle = Some(subtitle.to_string());
        }
        if let Some(category) = changes.category {
            let category = category.trim();
            check_length("Category", category, Some(CATEGORY_MIN_LENGTH), None)?;
            edit.category = Some(category.to_string());
        }
        if let Some(content) = changes.content {
            let content = content.trim();
            check_length("Content", content, Some(CONTENT_MIN_LENGTH), None)?;
            if content != post.content {
                edit.revision = Some(Revision {
                    content: post.content.clone(),
                    saved_at: Utc::now(),
                });
                edit.reading_time = Some(reading_time_minutes(content));
                edit.content = Some(content.to_string());
            }
        }
        if let Some(ai_content) = changes.ai_content {
            edit.ai_content = Some(Some(ai_content).filter(|s| !s.trim().is_empty()));
        }
        edit.header_image = changes.header_image;
        if let Some(hashtags) = changes.hashtags {
            edit.hashtags = Some(normalize_hashtags(&hashtags));
        }
        edit.visibility = changes.visibility;
        edit.status = changes.status;

        let updated = self
            .posts
            .apply_edit(&post.id, &edit)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))?;

        let mut views = self.populate(vec![updated]).await?;
        views
            .pop()
            .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))
    }

    pub async fn delete_post(&self, slug: &str, owner: &ObjectId) -> Result<(), CustomError> {
        let post = self.owned_post(slug, owner).await?;
        self.remove_post(&post).await
    }

    /// Account deletion cascade.
    pub async fn delete_posts_by_author(&self, author_id: &ObjectId) -> Result<usize, CustomError> {
        let posts = self.posts.list_by_author(author_id).await?;
        for post in &posts {
            self.remove_post(post).await?;
        }
        Ok(posts.len())
    }

    async fn remove_post(&self, post: &Post) -> Result<(), CustomError> {
        self.likes.delete_for_post(&post.id).await?;
        self.saves.delete_for_post(&post.id).await?;
        self.comments.delete_for_post(&post.id).await?;
        self.posts.delete(&post.id).await?;
        self.authors.forget_post(&post.author, &post.id).await?;
        log::info!("Post '{}' deleted", post.slug);
        Ok(())
    }

    async fn owned_post(&self, slug: &str, owner: &ObjectId) -> Result<Post, CustomError> {
        let post = find_post_or_404(self.posts.as_ref(), slug).await?;
        if post.author != *owner {
            return Err(CustomError::ForbiddenError(
                "Only the author can modify this post".to_string(),
            ));
        }
        Ok(post)
    }

    /// Attach author summaries, preserving input order.
    pub async fn populate(&self, posts: Vec<Post>) -> Result<Vec<PostView>, CustomError> {
        let mut author_ids: Vec<ObjectId> = posts.iter().map(|p| p.author).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<ObjectId, AuthorSummary> = self
            .users
            .find_many(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id, AuthorSummary::from(u)))
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author).cloned();
                PostView::new(post, author)
            })
            .collect())
    }
}

/// An explicit slug is normalized the same way as a derived one.
fn derive_slug(explicit: Option<&str>, title: &str) -> Result<String, CustomError> {
    let slug = explicit
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| slugify(title));
    if slug.is_empty() {
        return Err(CustomError::ValidationError(
            "Title must contain letters or numbers".to_string(),
        ));
    }
    Ok(slug)
}
