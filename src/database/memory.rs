//! In-memory repositories backing the service and HTTP tests.
//! Listing methods return newest first, matching the `_id` ordering of the Mongo impls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::comment::model::Comment;
use crate::comment::repository::CommentRepository;
use crate::engagement::model::Relation;
use crate::engagement::repository::RelationRepository;
use crate::post::post_model::{Post, PostEdit, PublishStatus, Visibility};
use crate::post::post_repository::PostRepository;
use crate::user::model::{ProfileChanges, Role, User, WordTally};
use crate::user::repository::UserRepository;
use crate::utils::error::CustomError;

#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), CustomError> {
        let mut store = self.store.write().await;
        if store.iter().any(|u| u.email == user.email) {
            return Err(CustomError::ConflictError(
                "Email already registered".to_string(),
            ));
        }
        store.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, CustomError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CustomError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, CustomError> {
        let store = self.store.read().await;
        Ok(store
            .iter()
            .find(|u| u.reset_password_token.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<User>, CustomError> {
        let store = self.store.read().await;
        Ok(store.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, CustomError> {
        let mut store = self.store.write().await;
        Ok(store.iter_mut().find(|u| u.id == *id).map(|user| {
            if let Some(name) = &changes.name {
                user.name = name.clone();
            }
            if let Some(bio) = &changes.bio {
                user.bio = bio.clone();
            }
            if let Some(avatar) = &changes.avatar {
                user.avatar = Some(avatar.clone());
            }
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_password(&self, id: &ObjectId, password_hash: &str) -> Result<bool, CustomError> {
        let mut store = self.store.write().await;
        Ok(store
            .iter_mut()
            .find(|u| u.id == *id)
            .map(|user| {
                user.password = password_hash.to_string();
                user.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn set_reset_token(
        &self,
        id: &ObjectId,
        token_hash: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, CustomError> {
        let mut store = self.store.write().await;
        Ok(store
            .iter_mut()
            .find(|u| u.id == *id)
            .map(|user| {
                user.reset_password_token = Some(token_hash.to_string());
                user.reset_password_expires = Some(expires);
                user.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn redeem_reset_token(
        &self,
        id: &ObjectId,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<bool, CustomError> {
        let mut store = self.store.write().await;
        Ok(store
            .iter_mut()
            .find(|u| u.id == *id && u.reset_password_token.as_deref() == Some(token_hash))
            .map(|user| {
                user.password = password_hash.to_string();
                user.reset_password_token = None;
                user.reset_password_expires = None;
                user.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn attach_post(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
        tally: &WordTally,
    ) -> Result<bool, CustomError> {
        let mut store = self.store.write().await;
        let Some(user) = store.iter_mut().find(|u| u.id == *user_id) else {
            return Ok(false);
        };
        if !user.posts.contains(post_id) {
            user.posts.push(*post_id);
        }
        if user.words_month != tally.month {
            user.words_month = tally.month.clone();
            user.words_this_month = 0;
        }
        user.words_this_month += tally.words;
        Ok(true)
    }

    async fn detach_post(&self, user_id: &ObjectId, post_id: &ObjectId) -> Result<(), CustomError> {
        let mut store = self.store.write().await;
        if let Some(user) = store.iter_mut().find(|u| u.id == *user_id) {
            user.posts.retain(|p| p != post_id);
        }
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|u| u.id != *id);
        Ok(store.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<Vec<Post>>,
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), CustomError> {
        let mut store = self.store.write().await;
        if store.iter().any(|p| p.slug == post.slug) {
            return Err(CustomError::ConflictError(format!(
                "A post with slug '{}' already exists",
                post.slug
            )));
        }
        store.push(post.clone());
        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, CustomError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|p| p.slug == slug).cloned())
    }

    async fn record_view(&self, slug: &str) -> Result<Option<Post>, CustomError> {
        let mut store = self.store.write().await;
        Ok(store.iter_mut().find(|p| p.slug == slug).map(|post| {
            post.views += 1;
            post.clone()
        }))
    }

    async fn list_all(&self) -> Result<Vec<Post>, CustomError> {
        let store = self.store.read().await;
        Ok(store.iter().rev().cloned().collect())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Post>, CustomError> {
        let store = self.store.read().await;
        Ok(store
            .iter()
            .rev()
            .filter(|p| p.category == category)
            .cloned()
            .collect())
    }

    async fn list_by_author(&self, author: &ObjectId) -> Result<Vec<Post>, CustomError> {
        let store = self.store.read().await;
        Ok(store
            .iter()
            .rev()
            .filter(|p| p.author == *author)
            .cloned()
            .collect())
    }

    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<Post>, CustomError> {
        let store = self.store.read().await;
        Ok(store
            .iter()
            .rev()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn apply_edit(&self, id: &ObjectId, edit: &PostEdit) -> Result<Option<Post>, CustomError> {
        let mut store = self.store.write().await;
        let Some(post) = store.iter_mut().find(|p| p.id == *id) else {
            return Ok(None);
        };
        if let Some(title) = &edit.title {
            post.title = title.clone();
        }
        if let Some(subtitle) = &edit.subtitle {
            post.subtitle = subtitle.clone();
        }
        if let Some(category) = &edit.category {
            post.category = category.clone();
        }
        if let Some(content) = &edit.content {
            post.content = content.clone();
        }
        if let Some(minutes) = edit.reading_time {
            post.reading_time = minutes;
        }
        if let Some(ai_content) = &edit.ai_content {
            post.ai_content = ai_content.clone();
        }
        if let Some(image) = &edit.header_image {
            post.header_image = Some(image.clone());
        }
        if let Some(hashtags) = &edit.hashtags {
            post.hashtags = hashtags.clone();
        }
        if let Some(visibility) = edit.visibility {
            post.visibility = visibility;
        }
        if let Some(status) = edit.status {
            post.status = status;
        }
        if let Some(revision) = &edit.revision {
            post.revisions.push(revision.clone());
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn adjust_bookmarks(&self, id: &ObjectId, delta: i64) -> Result<(), CustomError> {
        let mut store = self.store.write().await;
        if let Some(post) = store.iter_mut().find(|p| p.id == *id) {
            post.bookmarks += delta;
        }
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|p| p.id != *id);
        Ok(store.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryCommentRepository {
    store: RwLock<Vec<Comment>>,
}

impl InMemoryCommentRepository {
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), CustomError> {
        self.store.write().await.push(comment.clone());
        Ok(())
    }

    async fn list_for_post(&self, post: &ObjectId) -> Result<Vec<Comment>, CustomError> {
        let store = self.store.read().await;
        Ok(store.iter().filter(|c| c.post == *post).cloned().collect())
    }

    async fn delete_for_post(&self, post: &ObjectId) -> Result<u64, CustomError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|c| c.post != *post);
        Ok((before - store.len()) as u64)
    }

    async fn delete_for_user(&self, user: &ObjectId) -> Result<u64, CustomError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|c| c.user != *user);
        Ok((before - store.len()) as u64)
    }
}

/// Same contract as a collection with a unique `(post, user)` index.
#[derive(Default)]
pub struct InMemoryRelationRepository {
    store: RwLock<Vec<Relation>>,
}

impl InMemoryRelationRepository {
    pub async fn rows_for(&self, post: &ObjectId, user: &ObjectId) -> usize {
        let store = self.store.read().await;
        store
            .iter()
            .filter(|r| r.post == *post && r.user == *user)
            .count()
    }
}

#[async_trait]
impl RelationRepository for InMemoryRelationRepository {
    async fn add(&self, post: &ObjectId, user: &ObjectId) -> Result<bool, CustomError> {
        let mut store = self.store.write().await;
        if store.iter().any(|r| r.post == *post && r.user == *user) {
            return Ok(false);
        }
        store.push(Relation::new(*post, *user));
        Ok(true)
    }

    async fn remove(&self, post: &ObjectId, user: &ObjectId) -> Result<bool, CustomError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|r| !(r.post == *post && r.user == *user));
        Ok(store.len() < before)
    }

    async fn exists(&self, post: &ObjectId, user: &ObjectId) -> Result<bool, CustomError> {
        let store = self.store.read().await;
        Ok(store.iter().any(|r| r.post == *post && r.user == *user))
    }

    async fn count_for_post(&self, post: &ObjectId) -> Result<u64, CustomError> {
        let store = self.store.read().await;
        Ok(store.iter().filter(|r| r.post == *post).count() as u64)
    }

    async fn count_for_posts(&self, posts: &[ObjectId]) -> Result<u64, CustomError> {
        let store = self.store.read().await;
        Ok(store.iter().filter(|r| posts.contains(&r.post)).count() as u64)
    }

    async fn list_for_user(&self, user: &ObjectId) -> Result<Vec<Relation>, CustomError> {
        let store = self.store.read().await;
        Ok(store
            .iter()
            .rev()
            .filter(|r| r.user == *user)
            .cloned()
            .collect())
    }

    async fn delete_for_post(&self, post: &ObjectId) -> Result<u64, CustomError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|r| r.post != *post);
        Ok((before - store.len()) as u64)
    }

    async fn delete_for_user(&self, user: &ObjectId) -> Result<u64, CustomError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|r| r.user != *user);
        Ok((before - store.len()) as u64)
    }
}

/// Stored user with a placeholder password hash.
pub fn sample_user(name: &str, email: &str) -> User {
    let now = Utc::now();
    User {
        id: ObjectId::new(),
        name: name.to_string(),
        email: email.to_string(),
        password: "not-a-real-hash".to_string(),
        avatar: None,
        bio: String::new(),
        role: Role::User,
        words_this_month: 0,
        words_month: String::new(),
        posts: Vec::new(),
        reset_password_token: None,
        reset_password_expires: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_post(slug: &str, author: ObjectId) -> Post {
    let now = Utc::now();
    Post {
        id: ObjectId::new(),
        slug: slug.to_string(),
        author,
        title: slug.replace('-', " "),
        subtitle: String::new(),
        category: "Engineering".to_string(),
        content: "<p>A sample body for testing.</p>".to_string(),
        ai_content: None,
        header_image: None,
        hashtags: Vec::new(),
        visibility: Visibility::Public,
        status: PublishStatus::Published,
        views: 0,
        bookmarks: 0,
        reading_time: 1,
        revisions: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}
