use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};

use crate::user::model::User;
use crate::utils::model::ImageRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Unlisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Draft,
    #[default]
    Published,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub content: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub slug: String,
    pub author: ObjectId,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub category: String,
    pub content: String,
    #[serde(default)]
    pub ai_content: Option<String>,
    #[serde(default)]
    pub header_image: Option<ImageRef>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub bookmarks: i64,
    #[serde(default = "default_reading_time")]
    pub reading_time: i32,
    #[serde(default)]
    pub revisions: Vec<Revision>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_reading_time() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub avatar: Option<ImageRef>,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

/// Post as returned to clients, with the author populated when it still exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub slug: String,
    pub author: Option<AuthorSummary>,
    pub title: String,
    pub subtitle: String,
    pub category: String,
    pub content: String,
    pub ai_content: Option<String>,
    pub header_image: Option<ImageRef>,
    pub hashtags: Vec<String>,
    pub visibility: Visibility,
    pub status: PublishStatus,
    pub views: i64,
    pub bookmarks: i64,
    pub reading_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    pub fn new(post: Post, author: Option<AuthorSummary>) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            author,
            title: post.title,
            subtitle: post.subtitle,
            category: post.category,
            content: post.content,
            ai_content: post.ai_content,
            header_image: post.header_image,
            hashtags: post.hashtags,
            visibility: post.visibility,
            status: post.status,
            views: post.views,
            bookmarks: post.bookmarks,
            reading_time: post.reading_time,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub ai_content: Option<String>,
    pub header_image: Option<ImageRef>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub visibility: Option<Visibility>,
    pub status: Option<PublishStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub ai_content: Option<String>,
    pub header_image: Option<ImageRef>,
    pub hashtags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub status: Option<PublishStatus>,
}

/// Validated field changes for one edit. Absent fields are left untouched in
/// the store; `revision` is appended to the history.
#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub reading_time: Option<i32>,
    pub ai_content: Option<Option<String>>,
    pub header_image: Option<ImageRef>,
    pub hashtags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub status: Option<PublishStatus>,
    pub revision: Option<Revision>,
}
