use async_trait::async_trait;
use futures_util::TryStreamExt;
use chrono::Utc;
use mongodb::bson::{Document, doc, oid::ObjectId, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::post::post_model::{Post, PostEdit};
use crate::utils::error::CustomError;

/// Persistence for posts. List operations return newest first.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Fails with `ConflictError` when the slug is taken.
    async fn insert(&self, post: &Post) -> Result<(), CustomError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, CustomError>;
    /// Increment the view counter and return the updated post.
    async fn record_view(&self, slug: &str) -> Result<Option<Post>, CustomError>;
    async fn list_all(&self) -> Result<Vec<Post>, CustomError>;
    async fn list_by_category(&self, category: &str) -> Result<Vec<Post>, CustomError>;
    async fn list_by_author(&self, author: &ObjectId) -> Result<Vec<Post>, CustomError>;
    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<Post>, CustomError>;
    /// Write only the fields present in `edit` and return the stored post.
    async fn apply_edit(&self, id: &ObjectId, edit: &PostEdit) -> Result<Option<Post>, CustomError>;
    async fn adjust_bookmarks(&self, id: &ObjectId, delta: i64) -> Result<(), CustomError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError>;
}

pub struct MongoPostRepository {
    collection: Collection<Post>,
}

impl MongoPostRepository {
    pub fn new(db: &Database) -> Self {
        MongoPostRepository {
            collection: db.collection::<Post>("posts"),
        }
    }

    async fn find_sorted(&self, filter: mongodb::bson::Document) -> Result<Vec<Post>, CustomError> {
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), CustomError> {
        self.collection.insert_one(post).await.map_err(|e| {
            match CustomError::from(e) {
                CustomError::ConflictError(_) => CustomError::ConflictError(format!(
                    "A post with slug '{}' already exists",
                    post.slug
                )),
                other => other,
            }
        })?;
        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, CustomError> {
        Ok(self.collection.find_one(doc! { "slug": slug }).await?)
    }

    async fn record_view(&self, slug: &str) -> Result<Option<Post>, CustomError> {
        Ok(self
            .collection
            .find_one_and_update(doc! { "slug": slug }, doc! { "$inc": { "views": 1 } })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn list_all(&self) -> Result<Vec<Post>, CustomError> {
        self.find_sorted(doc! {}).await
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Post>, CustomError> {
        self.find_sorted(doc! { "category": category }).await
    }

    async fn list_by_author(&self, author: &ObjectId) -> Result<Vec<Post>, CustomError> {
        self.find_sorted(doc! { "author": author }).await
    }

    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<Post>, CustomError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_sorted(doc! { "_id": { "$in": ids.to_vec() } })
            .await
    }

    async fn apply_edit(&self, id: &ObjectId, edit: &PostEdit) -> Result<Option<Post>, CustomError> {
        let mut set = Document::new();
        if let Some(title) = &edit.title {
            set.insert("title", title.as_str());
        }
        if let Some(subtitle) = &edit.subtitle {
            set.insert("subtitle", subtitle.as_str());
        }
        if let Some(category) = &edit.category {
            set.insert("category", category.as_str());
        }
        if let Some(content) = &edit.content {
            set.insert("content", content.as_str());
        }
        if let Some(minutes) = edit.reading_time {
            set.insert("reading_time", minutes);
        }
        if let Some(ai_content) = &edit.ai_content {
            set.insert("ai_content", to_bson(ai_content)?);
        }
        if let Some(image) = &edit.header_image {
            set.insert("header_image", to_bson(image)?);
        }
        if let Some(hashtags) = &edit.hashtags {
            set.insert("hashtags", hashtags.clone());
        }
        if let Some(visibility) = edit.visibility {
            set.insert("visibility", to_bson(&visibility)?);
        }
        if let Some(status) = edit.status {
            set.insert("status", to_bson(&status)?);
        }
        set.insert("updated_at", to_bson(&Utc::now())?);

        let mut update = doc! { "$set": set };
        if let Some(revision) = &edit.revision {
            update.insert("$push", doc! { "revisions": to_bson(revision)? });
        }

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn adjust_bookmarks(&self, id: &ObjectId, delta: i64) -> Result<(), CustomError> {
        self.collection
            .update_one(doc! { "_id": id }, doc! { "$inc": { "bookmarks": delta } })
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
