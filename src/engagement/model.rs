use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A `(post, user)` membership row. Likes and saves share this shape and
/// each live in their own collection with a unique index on the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub post: ObjectId,
    pub user: ObjectId,
    pub created_at: DateTime<Utc>,
}

impl Relation {
    pub fn new(post: ObjectId, user: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            post,
            user,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub likes_count: u64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatus {
    pub is_saved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_posts: usize,
    pub total_likes: u64,
    pub total_views: i64,
    pub total_word_count: usize,
}
