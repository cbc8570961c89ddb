use crate::engagement::service::EngagementService;
use crate::middleware::auth::{AuthUser, SessionIssuer};
use crate::post::post_service::PostService;
use crate::user::model::{
    ChangePasswordRequest, CreateUserRequest, ForgotPasswordRequest, PublicUser,
    ResetPasswordRequest, UpdateAvatarRequest, UpdateBioRequest, UpdateProfileRequest,
    UpdateUsernameRequest, User,
};
use crate::user::service::UserService;
use crate::utils::email::EmailService;
use crate::utils::error::CustomError;
use crate::utils::model::{LoginRequest, parse_object_id};
use crate::utils::validation::require;
use actix_web::{HttpResponse, web};
use serde_json::json;

fn signed_in(
    issuer: &SessionIssuer,
    user: &User,
    mut response: actix_web::HttpResponseBuilder,
    message: &str,
) -> Result<HttpResponse, CustomError> {
    let token = issuer.issue(&user.id)?;
    Ok(response
        .cookie(issuer.session_cookie(&token))
        .json(json!({
            "success": true,
            "message": message,
            "user": PublicUser::from(user),
            "token": token
        })))
}

/// POST /api/user/register
pub async fn register_user(
    user_service: web::Data<UserService>,
    issuer: web::Data<SessionIssuer>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service.create_user(body.into_inner()).await?;
    signed_in(&issuer, &user, HttpResponse::Created(), "User registered successfully")
}

/// POST /api/user/login
pub async fn login_user(
    user_service: web::Data<UserService>,
    issuer: web::Data<SessionIssuer>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, CustomError> {
    let user = user_service.authenticate_user(body.into_inner()).await?;
    signed_in(&issuer, &user, HttpResponse::Ok(), "Login successful")
}

/// POST /api/user/logout
pub async fn logout_user(issuer: web::Data<SessionIssuer>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(issuer.cleared_cookie())
        .json(json!({
            "success": true,
            "message": "Logged out successfully"
        }))
}

/// GET /api/user/profile
pub async fn get_profile(auth: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "user": auth.0
    }))
}

/// GET /api/user/author/{id}
pub async fn get_author(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_object_id(&path.into_inner(), "user")?;
    let author = user_service.get_author(&id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "author": author
    })))
}

async fn apply_profile_changes(
    user_service: &UserService,
    auth: &AuthUser,
    changes: UpdateProfileRequest,
) -> Result<HttpResponse, CustomError> {
    let user = user_service.update_profile(&auth.id(), changes).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": PublicUser::from(&user)
    })))
}

/// PUT /api/user/settings/username
pub async fn update_username(
    user_service: web::Data<UserService>,
    auth: AuthUser,
    body: web::Json<UpdateUsernameRequest>,
) -> Result<HttpResponse, CustomError> {
    let name = require("Name", body.name.as_deref())?.to_string();
    let changes = UpdateProfileRequest {
        name: Some(name),
        bio: None,
        avatar: None,
    };
    apply_profile_changes(&user_service, &auth, changes).await
}

/// PUT /api/user/settings/bio
pub async fn update_bio(
    user_service: web::Data<UserService>,
    auth: AuthUser,
    body: web::Json<UpdateBioRequest>,
) -> Result<HttpResponse, CustomError> {
    let changes = UpdateProfileRequest {
        name: None,
        bio: Some(body.into_inner().bio.unwrap_or_default()),
        avatar: None,
    };
    apply_profile_changes(&user_service, &auth, changes).await
}

/// PUT /api/user/settings/avatar
pub async fn update_avatar(
    user_service: web::Data<UserService>,
    auth: AuthUser,
    body: web::Json<UpdateAvatarRequest>,
) -> Result<HttpResponse, CustomError> {
    let avatar = body
        .into_inner()
        .avatar
        .ok_or_else(|| CustomError::ValidationError("Avatar is required".to_string()))?;
    let changes = UpdateProfileRequest {
        name: None,
        bio: None,
        avatar: Some(avatar),
    };
    apply_profile_changes(&user_service, &auth, changes).await
}

/// PUT /api/user/settings/profile
pub async fn update_profile(
    user_service: web::Data<UserService>,
    auth: AuthUser,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, CustomError> {
    apply_profile_changes(&user_service, &auth, body.into_inner()).await
}

/// PUT /api/user/settings/password
pub async fn change_password(
    user_service: web::Data<UserService>,
    auth: AuthUser,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, CustomError> {
    let current = body
        .current_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| CustomError::ValidationError("Current password is required".into()))?;
    let new = body
        .new_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| CustomError::ValidationError("New password is required".into()))?;

    user_service.change_password(&auth.id(), current, new).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password updated successfully"
    })))
}

/// DELETE /api/user/settings/account
pub async fn delete_account(
    user_service: web::Data<UserService>,
    post_service: web::Data<PostService>,
    engagement_service: web::Data<EngagementService>,
    issuer: web::Data<SessionIssuer>,
    auth: AuthUser,
) -> Result<HttpResponse, CustomError> {
    let user_id = auth.id();

    let removed_posts = post_service.delete_posts_by_author(&user_id).await?;
    engagement_service.forget_user(&user_id).await?;
    user_service.delete_user(&user_id).await?;
    log::info!("Account {} deleted with {} posts", user_id, removed_posts);

    Ok(HttpResponse::Ok()
        .cookie(issuer.cleared_cookie())
        .json(json!({
            "success": true,
            "message": "Account deleted successfully"
        })))
}

/// POST /api/user/forgot-password
pub async fn forgot_password(
    user_service: web::Data<UserService>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, CustomError> {
    let email = require("Email", body.email.as_deref())?;

    if let Some((user, token)) = user_service.issue_reset_token(email).await? {
        let email_service = EmailService::new()
            .map_err(|e| CustomError::InternalServerError(format!("Email service error: {}", e)))?;
        email_service
            .send_password_reset_email(&user.email, &user.name, &token)
            .await
            .map_err(|e| {
                log::error!("Failed to send reset email to {}: {}", user.id, e);
                CustomError::InternalServerError("Failed to send reset email".to_string())
            })?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "If an account exists for that email, a reset link has been sent"
    })))
}

/// POST /api/user/reset-password/{token}
pub async fn reset_password(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, CustomError> {
    let password = body
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| CustomError::ValidationError("Password is required".into()))?;

    user_service
        .reset_password(&path.into_inner(), password)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password has been reset"
    })))
}
