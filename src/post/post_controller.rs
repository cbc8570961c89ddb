use crate::middleware::auth::AuthUser;
use crate::post::post_model::{CreatePostRequest, UpdatePostRequest};
use crate::post::post_service::PostService;
use crate::utils::error::CustomError;
use actix_web::{HttpResponse, web};
use serde_json::json;

/// Create a post owned by the caller
/// POST /posts
pub async fn create_post(
    post_service: web::Data<PostService>,
    auth: AuthUser,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service
        .create_post(auth.id(), body.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 201,
        "post": post
    })))
}

/// GET /posts
pub async fn list_posts(post_service: web::Data<PostService>) -> Result<HttpResponse, CustomError> {
    let posts = post_service.list_posts().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatusCode": 200,
        "count": posts.len(),
        "posts": posts
    })))
}

/// GET /posts/{slug}
pub async fn get_post(
    post_service: web::Data<PostService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service.get_post(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatusCode": 200,
        "post": post
    })))
}

/// GET /posts/category/{category}
pub async fn get_posts_by_category(
    post_service: web::Data<PostService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let posts = post_service.list_by_category(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatusCode": 200,
        "count": posts.len(),
        "posts": posts
    })))
}

/// GET /posts/user/my-posts
pub async fn get_my_posts(
    post_service: web::Data<PostService>,
    auth: AuthUser,
) -> Result<HttpResponse, CustomError> {
    let posts = post_service.list_by_author(&auth.id()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatusCode": 200,
        "count": posts.len(),
        "posts": posts
    })))
}

/// PUT /posts/{slug}
pub async fn update_post(
    post_service: web::Data<PostService>,
    auth: AuthUser,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service
        .update_post(&path.into_inner(), &auth.id(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post updated successfully",
        "httpStatusCode": 200,
        "post": post
    })))
}

/// DELETE /posts/{slug}
pub async fn delete_post(
    post_service: web::Data<PostService>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    post_service
        .delete_post(&path.into_inner(), &auth.id())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post deleted successfully",
        "httpStatusCode": 200
    })))
}
