use super::controller::upload_image;
use actix_web::web;

pub fn upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", web::post().to(upload_image));
}
