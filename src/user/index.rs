use super::controller::{
    change_password, delete_account, forgot_password, get_author, get_profile, login_user,
    logout_user, register_user, reset_password, update_avatar, update_bio, update_profile,
    update_username,
};
use actix_web::web;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/register", web::post().to(register_user))
            .route("/login", web::post().to(login_user))
            .route("/logout", web::post().to(logout_user))
            .route("/profile", web::get().to(get_profile))
            .route("/author/{id}", web::get().to(get_author))
            .route("/forgot-password", web::post().to(forgot_password))
            .route("/reset-password/{token}", web::post().to(reset_password))
            .route("/settings/username", web::put().to(update_username))
            .route("/settings/bio", web::put().to(update_bio))
            .route("/settings/avatar", web::put().to(update_avatar))
            .route("/settings/profile", web::put().to(update_profile))
            .route("/settings/password", web::put().to(change_password))
            .route("/settings/account", web::delete().to(delete_account)),
    );
}
