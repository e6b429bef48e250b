//! Route definitions for Warehouse Manager

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
///
/// Every entity kind shares one set of routes; the `:kind` segment is the
/// kind's plural path name (`clients`, `stocks`, `incomings`, ...).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:kind",
            get(handlers::list_entities).post(handlers::create_entity),
        )
        .route(
            "/:kind/:id",
            get(handlers::get_entity)
                .put(handlers::update_entity)
                .delete(handlers::delete_entity),
        )
        // Ledger
        .route("/:kind/:id/reverse", post(handlers::reverse_movement))
        .route("/:kind/:id/balance", get(handlers::get_stock_balance))
}
