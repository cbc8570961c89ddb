use crate::comment::model::CreateCommentRequest;
use crate::comment::service::CommentService;
use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use actix_web::{HttpResponse, web};
use serde_json::json;

/// Add a comment to a post
/// POST /posts/{slug}/comments
pub async fn add_comment(
    comment_service: web::Data<CommentService>,
    auth: AuthUser,
    path: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let comment = comment_service
        .add_comment(&path.into_inner(), auth.id(), body.text.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment added successfully",
        "httpStatusCode": 201,
        "comment": comment
    })))
}

/// Get all comments for a post, newest first
/// GET /posts/{slug}/comments
pub async fn list_comments(
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let comments = comment_service.list_comments(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatusCode": 200,
        "count": comments.len(),
        "comments": comments
    })))
}
