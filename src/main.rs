use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use mongodb::bson::doc;
use mongodb::Client;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod auth;
mod config;
mod domain;
mod errors;
mod http;
mod metrics;
mod store;
mod workflow;

use auth::{IdentityResolver, MongoIdentityResolver};
use config::Config;
use http::AppState;
use metrics::Metrics;
use store::MongoStore;
use workflow::OrderWorkflow;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bookstore_api=debug")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("🚀 Starting BookStore API");

    // === 1. Connect to MongoDB ===
    tracing::info!("Connecting to MongoDB at {}", config.mongodb_uri);
    let client = Client::with_uri_str(&config.mongodb_uri).await?;
    let db = client.database(&config.mongodb_db);
    db.run_command(doc! { "ping": 1 }).await?;
    tracing::info!("MongoDB connected, using database {}", config.mongodb_db);

    // === 2. Initialize Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);

    // === 3. Wire stores, identity resolution, and the order workflow ===
    let store = Arc::new(MongoStore::new(&db));
    let identity: Arc<dyn IdentityResolver> = Arc::new(MongoIdentityResolver::new(&db));
    let workflow = OrderWorkflow::new(
        store.clone(),
        store.clone(),
        store.clone(),
        metrics.clone(),
    );

    let state = web::Data::new(AppState {
        catalog: store,
        workflow,
        identity,
        metrics,
    });

    // === 4. Serve ===
    tracing::info!("Listening on http://{}:{}", config.bind_addr, config.port);
    HttpServer::new(move || App::new().app_data(state.clone()).configure(http::configure))
        .bind((config.bind_addr.as_str(), config.port))?
        .run()
        .await?;

    Ok(())
}
