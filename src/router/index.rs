use crate::ai::index::ai_routes;
use crate::post::post_index::post_routes;
use crate::uploader::index::upload_routes;
use crate::user::index::user_routes;
use crate::utils::error::CustomError;
use actix_web::web;

/// Malformed or mistyped JSON bodies get the same error envelope as everything else.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        CustomError::BadRequestError(format!("Invalid request body: {}", err)).into()
    })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    cfg.service(
        web::scope("/api")
            .configure(user_routes)
            .configure(post_routes)
            .configure(ai_routes)
            .configure(upload_routes),
    );
}
