use actix_cors::Cors;
use actix_web::http::{StatusCode, header};
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use env_logger::Env;
use log::{error, info};

mod ai;
mod comment;
mod database;
mod engagement;
mod middleware;
mod post;
mod router;
mod uploader;
mod user;
mod utils;

use middleware::error_handler::handle_error;
use middleware::not_found::not_found;
use router::index::routes;
use router::state::AppServices;
use serde_json::json;
use utils::config::AppConfig;
use utils::error::service_name;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Writeora API is running",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": service_name(),
    }))
}

fn build_cors(config: &AppConfig) -> Cors {
    Cors::default()
        .allowed_origin(&config.client_url)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mongo_client = match database::connect_to_mongo(&config).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };
    let db = mongo_client.database(&config.database_name);
    if let Err(e) = database::ensure_indexes(&db).await {
        error!("Failed to create database indexes: {}", e);
        std::process::exit(1);
    }

    let services = AppServices::from_config(&db, &config);
    let server_config = config.clone();

    info!(
        "Starting server on http://{}:{} ({})",
        config.host, config.port, config.environment
    );

    HttpServer::new(move || {
        App::new()
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, not_found)
                    .default_handler(handle_error),
            )
            .wrap(build_cors(&server_config))
            .wrap(Logger::default())
            .configure(|cfg| services.register(cfg))
            .configure(routes)
            .service(default)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    mongo_client.shutdown().await;
    info!("Server has stopped");

    Ok(())
}
