use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};

use crate::utils::model::ImageRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub avatar: Option<ImageRef>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub words_this_month: i64,
    #[serde(default)]
    pub words_month: String,
    #[serde(default)]
    pub posts: Vec<ObjectId>,
    #[serde(default)]
    pub reset_password_token: Option<String>,
    #[serde(default)]
    pub reset_password_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User record as exposed to clients and request handlers: no password hash,
/// no reset token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub avatar: Option<ImageRef>,
    pub bio: String,
    pub role: Role,
    pub words_this_month: i64,
    pub posts_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            role: user.role,
            words_this_month: user.words_this_month,
            posts_count: user.posts.len(),
            created_at: user.created_at,
        }
    }
}

/// Profile fields visible to anyone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub name: String,
    pub avatar: Option<ImageRef>,
    pub bio: String,
    pub role: Role,
    pub posts_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for AuthorProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            role: user.role,
            posts_count: user.posts.len(),
            created_at: user.created_at,
        }
    }
}

/// Words to add to the author's tally for `month`. A tally still keyed to an
/// earlier month starts again from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct WordTally {
    pub month: String,
    pub words: i64,
}

/// Validated profile fields to overwrite. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<ImageRef>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUsernameRequest {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBioRequest {
    pub bio: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateAvatarRequest {
    pub avatar: Option<ImageRef>,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<ImageRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}
