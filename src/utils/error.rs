use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use mongodb::error::{ErrorKind, WriteFailure};
use serde_json::json;
use thiserror::Error;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Unauthorized: {0}")]
    UnauthorizedError(String),

    #[error("Bad Request: {0}")]
    BadRequestError(String),

    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Upstream Error: {0}")]
    UpstreamError(String),

    #[error("Not Found: {0}")]
    NotFoundError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),
}

impl CustomError {
    fn kind(&self) -> &'static str {
        match self {
            CustomError::UnauthorizedError(..) => "UNAUTHORIZED_ERROR",
            CustomError::BadRequestError(..) => "BAD_REQUEST_ERROR",
            CustomError::ForbiddenError(..) => "FORBIDDEN_ERROR",
            CustomError::ConflictError(..) => "CONFLICT_ERROR",
            CustomError::InternalServerError(..) => "INTERNAL_SERVER_ERROR",
            CustomError::UpstreamError(..) => "UPSTREAM_ERROR",
            CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
            CustomError::ValidationError(..) => "VALIDATION_ERROR",
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::ForbiddenError(..) => StatusCode::FORBIDDEN,
            CustomError::ConflictError(..) => StatusCode::CONFLICT,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::UpstreamError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.kind(),
            "service": service_name(),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}

/// Store failures surface as 500 unless the driver reports a unique index violation.
impl From<mongodb::error::Error> for CustomError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            return CustomError::ConflictError("Resource already exists".to_string());
        }
        log::error!("MongoDB operation failed: {}", err);
        CustomError::InternalServerError("Database operation failed".to_string())
    }
}

impl From<mongodb::bson::ser::Error> for CustomError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        log::error!("Failed to encode update document: {}", err);
        CustomError::InternalServerError("Database operation failed".to_string())
    }
}

pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}

pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(
            CustomError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CustomError::ConflictError("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CustomError::UpstreamError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            CustomError::ForbiddenError("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[actix_web::test]
    async fn error_body_carries_message() {
        let response = CustomError::NotFoundError("Post not found".into()).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Not Found: Post not found");
        assert_eq!(value["error"], "NOT_FOUND_ERROR");
        assert_eq!(value["httpStatusCode"], 404);
    }
}
