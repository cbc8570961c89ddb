use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::engagement::model::Relation;
use crate::utils::error::{CustomError, is_duplicate_key};

pub const LIKES_COLLECTION: &str = "likes";
pub const SAVES_COLLECTION: &str = "saves";

/// Set-keyed `(post, user)` relation with idempotent add and remove.
#[async_trait]
pub trait RelationRepository: Send + Sync {
    /// Returns false when the pair was already present.
    async fn add(&self, post: &ObjectId, user: &ObjectId) -> Result<bool, CustomError>;
    /// Returns false when the pair was absent.
    async fn remove(&self, post: &ObjectId, user: &ObjectId) -> Result<bool, CustomError>;
    async fn exists(&self, post: &ObjectId, user: &ObjectId) -> Result<bool, CustomError>;
    async fn count_for_post(&self, post: &ObjectId) -> Result<u64, CustomError>;
    async fn count_for_posts(&self, posts: &[ObjectId]) -> Result<u64, CustomError>;
    /// Newest first.
    async fn list_for_user(&self, user: &ObjectId) -> Result<Vec<Relation>, CustomError>;
    async fn delete_for_post(&self, post: &ObjectId) -> Result<u64, CustomError>;
    async fn delete_for_user(&self, user: &ObjectId) -> Result<u64, CustomError>;
}

pub struct MongoRelationRepository {
    collection: Collection<Relation>,
}

impl MongoRelationRepository {
    pub fn new(db: &Database, name: &str) -> Self {
        MongoRelationRepository {
            collection: db.collection::<Relation>(name),
        }
    }
}

#[async_trait]
impl RelationRepository for MongoRelationRepository {
    async fn add(&self, post: &ObjectId, user: &ObjectId) -> Result<bool, CustomError> {
        match self.collection.insert_one(Relation::new(*post, *user)).await {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, post: &ObjectId, user: &ObjectId) -> Result<bool, CustomError> {
        let result = self
            .collection
            .delete_one(doc! { "post": post, "user": user })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn exists(&self, post: &ObjectId, user: &ObjectId) -> Result<bool, CustomError> {
        let count = self
            .collection
            .count_documents(doc! { "post": post, "user": user })
            .await?;
        Ok(count > 0)
    }

    async fn count_for_post(&self, post: &ObjectId) -> Result<u64, CustomError> {
        Ok(self.collection.count_documents(doc! { "post": post }).await?)
    }

    async fn count_for_posts(&self, posts: &[ObjectId]) -> Result<u64, CustomError> {
        if posts.is_empty() {
            return Ok(0);
        }
        Ok(self
            .collection
            .count_documents(doc! { "post": { "$in": posts.to_vec() } })
            .await?)
    }

    async fn list_for_user(&self, user: &ObjectId) -> Result<Vec<Relation>, CustomError> {
        let cursor = self
            .collection
            .find(doc! { "user": user })
            .sort(doc! { "_id": -1 })
            .await?;
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
