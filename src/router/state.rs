use crate::ai::gateway::{GeminiClient, TextGenerator};
use crate::ai::service::AiService;
use crate::comment::repository::{CommentRepository, MongoCommentRepository};
use crate::comment::service::CommentService;
use crate::engagement::repository::{
    LIKES_COLLECTION, MongoRelationRepository, RelationRepository, SAVES_COLLECTION,
};
use crate::engagement::service::EngagementService;
use crate::middleware::auth::SessionIssuer;
use crate::post::post_repository::{MongoPostRepository, PostRepository};
use crate::post::post_service::PostService;
use crate::user::repository::{MongoUserRepository, UserRepository};
use crate::user::service::UserService;
use crate::utils::config::AppConfig;
use actix_web::web;
use mongodb::Database;
use std::sync::Arc;

/// Storage handles shared by every service.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn RelationRepository>,
    pub saves: Arc<dyn RelationRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Self {
            users: Arc::new(MongoUserRepository::new(db)),
            posts: Arc::new(MongoPostRepository::new(db)),
            comments: Arc::new(MongoCommentRepository::new(db)),
            likes: Arc::new(MongoRelationRepository::new(db, LIKES_COLLECTION)),
            saves: Arc::new(MongoRelationRepository::new(db, SAVES_COLLECTION)),
        }
    }
}

/// Every service the handlers extract, built once and cloned into each worker.
#[derive(Clone)]
pub struct AppServices {
    pub users: web::Data<UserService>,
    pub posts: web::Data<PostService>,
    pub comments: web::Data<CommentService>,
    pub engagement: web::Data<EngagementService>,
    pub ai: web::Data<AiService>,
    pub sessions: web::Data<SessionIssuer>,
}

impl AppServices {
    pub fn new(
        repos: Repositories,
        generator: Arc<dyn TextGenerator>,
        sessions: SessionIssuer,
    ) -> Self {
        let Repositories {
            users,
            posts,
            comments,
            likes,
            saves,
        } = repos;

        Self {
            users: web::Data::new(UserService::new(users.clone())),
            posts: web::Data::new(PostService::new(
                posts.clone(),
                users.clone(),
                comments.clone(),
                likes.clone(),
                saves.clone(),
            )),
            comments: web::Data::new(CommentService::new(
                comments.clone(),
                posts.clone(),
                users,
            )),
            engagement: web::Data::new(EngagementService::new(posts, comments, likes, saves)),
            ai: web::Data::new(AiService::new(generator)),
            sessions: web::Data::new(sessions),
        }
    }

    pub fn from_config(db: &Database, config: &AppConfig) -> Self {
        if config.gemini.api_key.is_none() {
            log::warn!("GEMINI_API_KEY is not set; AI assist requests will fail");
        }

        Self::new(
            Repositories::mongo(db),
            Arc::new(GeminiClient::new(config.gemini.clone())),
            SessionIssuer::new(&config.jwt_secret, !config.is_development()),
        )
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.users.clone())
            .app_data(self.posts.clone())
            .app_data(self.comments.clone())
            .app_data(self.engagement.clone())
            .app_data(self.ai.clone())
            .app_data(self.sessions.clone());
    }
}
