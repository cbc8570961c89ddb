use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::comment::model::Comment;
use crate::utils::error::CustomError;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: &Comment) -> Result<(), CustomError>;
    /// Stored order; callers sort.
    async fn list_for_post(&self, post: &ObjectId) -> Result<Vec<Comment>, CustomError>;
    async fn delete_for_post(&self, post: &ObjectId) -> Result<u64, CustomError>;
    async fn delete_for_user(&self, user: &ObjectId) -> Result<u64, CustomError>;
}

pub struct MongoCommentRepository {
    collection: Collection<Comment>,
}

impl MongoCommentRepository {
    pub fn new(db: &Database) -> Self {
        MongoCommentRepository {
            collection: db.collection::<Comment>("comments"),
        }
    }
}

#[async_trait]
impl CommentRepository for MongoCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), CustomError> {
        self.collection.insert_one(comment).await?;
        Ok(())
    }

    async fn list_for_post(&self, post: &ObjectId) -> Result<Vec<Comment>, CustomError> {
        let cursor = self.collection.find(doc! { "post": post }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn delete_for_post(&self, post: &ObjectId) -> Result<u64, CustomError> {
        let result = self.collection.delete_many(doc! { "post": post }).await?;
        Ok(result.deleted_count)
    }

    async fn delete_for_user(&self, user: &ObjectId) -> Result<u64, CustomError> {
        let result = self.collection.delete_many(doc! { "user": user }).await?;
        Ok(result.deleted_count)
    }
}
