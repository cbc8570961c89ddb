use async_trait::async_trait;
use futures_util::TryStreamExt;
use chrono::{DateTime, Utc};
use mongodb::bson::{Document, doc, oid::ObjectId, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::user::model::{ProfileChanges, User, WordTally};
use crate::utils::error::CustomError;

/// Persistence for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `ConflictError` when the email is already registered.
    async fn insert(&self, user: &User) -> Result<(), CustomError>;
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, CustomError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CustomError>;
    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, CustomError>;
    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<User>, CustomError>;
    /// Overwrites only the fields present in `changes`.
    async fn update_profile(
        &self,
        id: &ObjectId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, CustomError>;
    async fn set_password(&self, id: &ObjectId, password_hash: &str) -> Result<bool, CustomError>;
    async fn set_reset_token(
        &self,
        id: &ObjectId,
        token_hash: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, CustomError>;
    /// Sets the password and clears the token, provided the stored token still
    /// matches. Returns false when it was already redeemed or replaced.
    async fn redeem_reset_token(
        &self,
        id: &ObjectId,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<bool, CustomError>;
    /// Append a post reference and add `tally.words` to the monthly tally.
    /// Returns false when the user does not exist.
    async fn attach_post(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
        tally: &WordTally,
    ) -> Result<bool, CustomError>;
    async fn detach_post(&self, user_id: &ObjectId, post_id: &ObjectId) -> Result<(), CustomError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        MongoUserRepository {
            collection: db.collection::<User>("users"),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: &User) -> Result<(), CustomError> {
        self.collection.insert_one(user).await.map_err(|e| {
            match CustomError::from(e) {
                CustomError::ConflictError(_) => {
                    CustomError::ConflictError("Email already registered".to_string())
                }
                other => other,
            }
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, CustomError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CustomError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, CustomError> {
        Ok(self
            .collection
            .find_one(doc! { "reset_password_token": token_hash })
            .await?)
    }

    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<User>, CustomError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, CustomError> {
        let mut set = Document::new();
        if let Some(name) = &changes.name {
            set.insert("name", name.as_str());
        }
        if let Some(bio) = &changes.bio {
            set.insert("bio", bio.as_str());
        }
        if let Some(avatar) = &changes.avatar {
            set.insert("avatar", to_bson(avatar)?);
        }
        set.insert("updated_at", to_bson(&Utc::now())?);

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn set_password(&self, id: &ObjectId, password_hash: &str) -> Result<bool, CustomError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "password": password_hash,
                    "updated_at": to_bson(&Utc::now())?,
                } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_reset_token(
        &self,
        id: &ObjectId,
        token_hash: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, CustomError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "reset_password_token": token_hash,
                    "reset_password_expires": to_bson(&expires)?,
                    "updated_at": to_bson(&Utc::now())?,
                } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn redeem_reset_token(
        &self,
        id: &ObjectId,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<bool, CustomError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "reset_password_token": token_hash },
                doc! {
                    "$set": {
                        "password": password_hash,
                        "updated_at": to_bson(&Utc::now())?,
                    },
                    "$unset": { "reset_password_token": "", "reset_password_expires": "" },
                },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn attach_post(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
        tally: &WordTally,
    ) -> Result<bool, CustomError> {
        // Roll the tally over first; a no-op once some writer has moved it to this month.
        self.collection
            .update_one(
                doc! { "_id": user_id, "words_month": { "$ne": tally.month.as_str() } },
                doc! { "$set": { "words_month": tally.month.as_str(), "words_this_month": 0_i64 } },
            )
            .await?;

        let result = self
            .collection
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$addToSet": { "posts": post_id },
                    "$inc": { "words_this_month": tally.words },
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn detach_post(&self, user_id: &ObjectId, post_id: &ObjectId) -> Result<(), CustomError> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$pull": { "posts": post_id } },
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
