use crate::user::model::PublicUser;
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::dev::Payload;
use actix_web::http::header::Header;
use actix_web::{FromRequest, HttpMessage, HttpRequest, web};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{DecodingKey, EncodingKey, Header as JwtHeader, Validation, decode, encode};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "token";
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub iat: usize,
    pub exp: usize,
}

/// Signs and verifies session tokens and builds the cookie that carries them.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    secure_cookies: bool,
}

impl SessionIssuer {
    pub fn new(secret: &str, secure_cookies: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            secure_cookies,
        }
    }

    pub fn issue(&self, user_id: &ObjectId) -> Result<String, CustomError> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id.to_hex(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp() as usize,
        };

        encode(&JwtHeader::default(), &claims, &self.encoding_key)
            .map_err(|_| CustomError::InternalServerError("Token generation failed".to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<ObjectId, CustomError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    CustomError::UnauthorizedError("Session expired".to_string())
                }
                _ => CustomError::UnauthorizedError("Invalid token".to_string()),
            })?;

        ObjectId::parse_str(&token_data.claims.id)
            .map_err(|_| CustomError::UnauthorizedError("Invalid token".to_string()))
    }

    pub fn session_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token.to_owned())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure_cookies)
            .max_age(CookieDuration::days(SESSION_TTL_DAYS))
            .finish()
    }

    /// Expires the session cookie immediately.
    pub fn cleared_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie("");
        cookie.make_removal();
        cookie
    }
}

/// Outcome of resolving the caller of a request.
#[derive(Debug, Clone)]
pub enum Identity {
    Authenticated(PublicUser),
    Anonymous,
}

impl Identity {
    pub fn user_id(&self) -> Option<ObjectId> {
        match self {
            Identity::Authenticated(user) => Some(user.id),
            Identity::Anonymous => None,
        }
    }
}

/// Caller that must be signed in; extraction fails with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub PublicUser);

impl AuthUser {
    pub fn id(&self) -> ObjectId {
        self.0.id
    }
}

/// Session cookie first, bearer header as fallback.
fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    Authorization::<Bearer>::parse(req)
        .ok()
        .map(|auth| auth.into_scheme().token().to_string())
}

pub async fn resolve_identity(req: &HttpRequest) -> Result<Identity, CustomError> {
    let Some(token) = session_token(req) else {
        return Ok(Identity::Anonymous);
    };

    let issuer = req
        .app_data::<web::Data<SessionIssuer>>()
        .ok_or_else(|| CustomError::InternalServerError("Session issuer missing".to_string()))?;
    let user_id = match issuer.validate(&token) {
        Ok(id) => id,
        Err(e) => {
            log::debug!("Rejected session token: {}", e);
            return Ok(Identity::Anonymous);
        }
    };

    let users = req
        .app_data::<web::Data<UserService>>()
        .ok_or_else(|| CustomError::InternalServerError("User service missing".to_string()))?;
    Ok(match users.find_user(&user_id).await? {
        Some(user) => Identity::Authenticated(PublicUser::from(&user)),
        None => Identity::Anonymous,
    })
}

impl FromRequest for Identity {
    type Error = CustomError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            Ok(resolve_identity(&req).await.unwrap_or_else(|e| {
                log::warn!("Identity resolution failed, continuing anonymously: {}", e);
                Identity::Anonymous
            }))
        })
    }
}

impl FromRequest for AuthUser {
    type Error = CustomError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match resolve_identity(&req).await? {
                Identity::Authenticated(user) => {
                    req.extensions_mut().insert(user.clone());
                    Ok(AuthUser(user))
                }
                Identity::Anonymous => Err(CustomError::UnauthorizedError(
                    "Authentication required".to_string(),
                )),
            }
        })
    }
}
