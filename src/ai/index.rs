use super::controller::{expand, fix_grammar, generate, shorten};
use actix_web::web;

pub fn ai_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ai")
            .route("/expand", web::post().to(expand))
            .route("/shorten", web::post().to(shorten))
            .route("/fix-grammar", web::post().to(fix_grammar))
            .route("/generate", web::post().to(generate)),
    );
}
