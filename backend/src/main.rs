//! Warehouse Manager - Backend Server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warehouse_manager::{
    config::{Config, StorageBackend},
    create_app,
    error::AppError,
    store::{MemoryStore, PgStore, Store},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "wm_server=debug,warehouse_manager=debug,tower_http=debug,sqlx=warn".into()
    });
    let json_logs = std::env::var("WM_LOG_FORMAT").map_or(false, |f| f == "json");
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Load configuration
    let config = Config::load().map_err(|err| AppError::Configuration(err.to_string()))?;
    config.validate()?;

    tracing::info!("Starting Warehouse Manager Server");
    tracing::info!("Environment: {}", config.environment);

    let store: Arc<dyn Store> = match config.storage.backend {
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await?;
            tracing::info!("Database connection established");
            Arc::new(PgStore::new(db_pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let seed_sample = config.storage.seed_sample;

    // Create application state
    let state = AppState::new(store, config);

    let created = state.repository.initialize(seed_sample).await?;
    tracing::info!(
        created = created,
        seed_sample = seed_sample,
        missing_vehicle = ?state.ledger.missing_vehicle_policy(),
        "Store initialized"
    );

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
