use crate::engagement::service::EngagementService;
use crate::middleware::auth::{AuthUser, Identity};
use crate::post::post_service::PostService;
use crate::utils::error::CustomError;
use crate::utils::model::parse_object_id;
use actix_web::{HttpResponse, web};
use serde_json::json;

/// POST /posts/{slug}/likes
pub async fn toggle_like(
    engagement: web::Data<EngagementService>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let status = engagement.toggle_like(&path.into_inner(), &auth.id()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "likesCount": status.likes_count,
        "isLiked": status.is_liked
    })))
}

/// GET /posts/{slug}/likes
pub async fn get_like_status(
    engagement: web::Data<EngagementService>,
    identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let status = engagement.like_status(&path.into_inner(), &identity).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "likesCount": status.likes_count,
        "isLiked": status.is_liked
    })))
}

/// POST /posts/{slug}/save
pub async fn toggle_save(
    engagement: web::Data<EngagementService>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let status = engagement.toggle_save(&path.into_inner(), &auth.id()).await?;
    let message = if status.is_saved {
        "Post saved"
    } else {
        "Post removed from saved"
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "isSaved": status.is_saved
    })))
}

/// GET /posts/{slug}/save
pub async fn get_save_status(
    engagement: web::Data<EngagementService>,
    identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let status = engagement.save_status(&path.into_inner(), &identity).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "isSaved": status.is_saved
    })))
}

/// GET /posts/user/saved
pub async fn get_saved_posts(
    engagement: web::Data<EngagementService>,
    post_service: web::Data<PostService>,
    auth: AuthUser,
) -> Result<HttpResponse, CustomError> {
    let posts = engagement
        .list_saved_posts(&auth.id(), &post_service)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatusCode": 200,
        "count": posts.len(),
        "posts": posts
    })))
}

/// GET /posts/user/stats
pub async fn get_user_stats(
    engagement: web::Data<EngagementService>,
    auth: AuthUser,
) -> Result<HttpResponse, CustomError> {
    let stats = engagement.user_stats(&auth.id()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatusCode": 200,
        "stats": stats
    })))
}

/// GET /posts/user/stats/{id}
pub async fn get_user_stats_by_id(
    engagement: web::Data<EngagementService>,
    _auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let user_id = parse_object_id(&path.into_inner(), "user")?;
    let stats = engagement.user_stats(&user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatusCode": 200,
        "stats": stats
    })))
}
