use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::error::CustomError;

/// Hosted image reference returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: String,
    pub url: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub fn parse_object_id(value: &str, what: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(value)
        .map_err(|_| CustomError::BadRequestError(format!("Invalid {} ID", what)))
}
