use super::post_controller::{
    create_post, delete_post, get_my_posts, get_post, get_posts_by_category, list_posts,
    update_post,
};
use crate::comment::controller::{add_comment, list_comments};
use crate::engagement::controller::{
    get_like_status, get_save_status, get_saved_posts, get_user_stats, get_user_stats_by_id,
    toggle_like, toggle_save,
};
use actix_web::web;

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::get().to(list_posts))
            .route("", web::post().to(create_post))
            .route("/user/saved", web::get().to(get_saved_posts))
            .route("/user/stats", web::get().to(get_user_stats))
            .route("/user/stats/{id}", web::get().to(get_user_stats_by_id))
            .route("/user/my-posts", web::get().to(get_my_posts))
            .route("/category/{category}", web::get().to(get_posts_by_category))
            .route("/{slug}/likes", web::post().to(toggle_like))
            .route("/{slug}/likes", web::get().to(get_like_status))
            .route("/{slug}/comments", web::post().to(add_comment))
            .route("/{slug}/comments", web::get().to(list_comments))
            .route("/{slug}/save", web::post().to(toggle_save))
            .route("/{slug}/save", web::get().to(get_save_status))
            .route("/{slug}", web::get().to(get_post))
            .route("/{slug}", web::put().to(update_post))
            .route("/{slug}", web::delete().to(delete_post)),
    );
}
