//! Warehouse Manager - Backend
//!
//! Tracks client-owned stock balances across incoming deliveries, shipments
//! and stock-to-stock transfers, over a PostgreSQL or in-memory store.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::{EntityRepository, ListingService, StockLedger};
use store::Store;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub ledger: StockLedger,
    pub repository: EntityRepository,
    pub listing: ListingService,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the services around one store handle
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let ledger = StockLedger::new(store.clone(), config.ledger.missing_vehicle);
        let repository = EntityRepository::new(store.clone(), ledger.clone());
        let listing = ListingService::new(store.clone(), config.paging.items_per_page);

        Self {
            store,
            ledger,
            repository,
            listing,
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
