use crate::engagement::repository::{LIKES_COLLECTION, SAVES_COLLECTION};
use crate::utils::config::AppConfig;
use mongodb::bson::{Document, doc};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};

/// Connect and ping so a bad URI fails at startup, not on first request.
pub async fn connect_to_mongo(config: &AppConfig) -> Result<Client, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse(&config.mongodb_uri).await?;
    client_options.app_name = Some("writeora-backend".to_string());

    let client = Client::with_options(client_options)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;

    log::info!("Connected successfully to MongoDB");
    Ok(client)
}

fn unique_index(keys: Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

/// Unique indexes the repositories rely on for conflict detection and idempotent toggles.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    db.collection::<Document>("users")
        .create_index(unique_index(doc! { "email": 1 }))
        .await?;
    db.collection::<Document>("posts")
        .create_index(unique_index(doc! { "slug": 1 }))
        .await?;
    db.collection::<Document>("posts")
        .create_index(IndexModel::builder().keys(doc! { "author": 1 }).build())
        .await?;
    db.collection::<Document>("comments")
        .create_index(IndexModel::builder().keys(doc! { "post": 1, "created_at": -1 }).build())
        .await?;

    for name in [LIKES_COLLECTION, SAVES_COLLECTION] {
        let relations = db.collection::<Document>(name);
        relations
            .create_index(unique_index(doc! { "post": 1, "user": 1 }))
            .await?;
        relations
            .create_index(IndexModel::builder().keys(doc! { "user": 1 }).build())
            .await?;
    }

    log::info!("Database indexes are in place");
    Ok(())
}
