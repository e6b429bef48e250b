//! HTTP handlers for ledger operations

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use shared::{EntityKind, Movement};

use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StockBalance {
    pub stock_id: i32,
    pub balance: i32,
}

/// Undo a movement and delete it
pub async fn reverse_movement(
    State(state): State<AppState>,
    Path((kind, id)): Path<(EntityKind, i32)>,
) -> AppResult<Json<Movement>> {
    let movement = state.ledger.reverse_movement(kind, id).await?;
    Ok(Json(movement))
}

/// Current balance of a stock
pub async fn get_stock_balance(
    State(state): State<AppState>,
    Path((kind, stock_id)): Path<(EntityKind, i32)>,
) -> AppResult<Json<StockBalance>> {
    if kind != EntityKind::Stock {
        return Err(AppError::Validation {
            field: "kind".to_string(),
            message: format!("{} has no balance", kind),
            message_pt: format!("{} não possui saldo", kind),
        });
    }

    let balance = state.ledger.balance(stock_id).await?;
    Ok(Json(StockBalance { stock_id, balance }))
}
