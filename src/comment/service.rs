use crate::comment::model::{Comment, CommentAuthor, CommentView};
use crate::comment::repository::CommentRepository;
use crate::post::post_repository::PostRepository;
use crate::post::post_service::find_post_or_404;
use crate::user::repository::UserRepository;
use crate::utils::error::CustomError;
use crate::utils::validation::check_length;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;

pub const COMMENT_MAX_LENGTH: usize = 1000;

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        CommentService {
            comments,
            posts,
            users,
        }
    }

    /// Add a comment to the post identified by `slug`
    pub async fn add_comment(
        &self,
        slug: &str,
        user_id: ObjectId,
        text: Option<&str>,
    ) -> Result<CommentView, CustomError> {
        let text = text.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(CustomError::ValidationError(
                "Comment text cannot be empty".to_string(),
            ));
        }
        check_length("Comment", text, Some(1), Some(COMMENT_MAX_LENGTH))?;

        let post = find_post_or_404(self.posts.as_ref(), slug).await?;

        let comment = Comment {
            id: ObjectId::new(),
            post: post.id,
            user: user_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.comments.insert(&comment).await?;

        let author = self.users.find_by_id(&user_id).await?;
        Ok(CommentView {
            id: comment.id,
            post: comment.post,
            user: author.as_ref().map(CommentAuthor::from),
            text: comment.text,
            created_at: comment.created_at,
        })
    }

    /// All comments of a post, newest first
    pub async fn list_comments(&self, slug: &str) -> Result<Vec<CommentView>, CustomError> {
        let post = find_post_or_404(self.posts.as_ref(), slug).await?;

        let mut comments = self.comments.list_for_post(&post.id).await?;
        sort_newest_first(&mut comments);

        let mut author_ids: Vec<ObjectId> = comments.iter().map(|c| c.user).collect();
        author_ids.sort();
        author_ids.dedup();
        let authors: HashMap<ObjectId, CommentAuthor> = self
            .users
            .find_many(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id, CommentAuthor::from(u)))
            .collect();

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                id: c.id,
                post: c.post,
                user: authors.get(&c.user).cloned(),
                text: c.text,
                created_at: c.created_at,
            })
            .collect())
    }
}

pub fn sort_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
