//! MeliBuy - guided supplier-quote chat service
//!
//! Walks a buyer from category to material to delivery region and answers
//! with the three cheapest supplier quotes from the catalog.

mod api;
mod catalog;
mod config;
mod db;
mod dialogue;
mod runtime;

use api::{create_router, ApiKey, AppState};
use catalog::Catalog;
use config::AppConfig;
use db::Database;
use runtime::DatabaseStorage;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "melibuy=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    let catalog = Catalog::new(&config.catalog_path);
    if !catalog.path().exists() {
        tracing::warn!(
            path = %catalog.path().display(),
            "Catalog database not found; chat turns will fail until it is in place"
        );
    }

    // Ensure session database directory exists
    if let Some(parent) = config.session_db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.session_db_path.display(), "Opening session database");
    let db = Database::open(&config.session_db_path)?;

    let api_key = ApiKey::new(config.api_key.as_deref());
    if !api_key.is_enabled() {
        tracing::warn!("MELIBUY_API_KEY not set; endpoints are open");
    }

    let state = AppState::new(catalog, Arc::new(DatabaseStorage::new(db)), api_key);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("MeliBuy server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
