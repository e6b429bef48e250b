//! HTTP surface tests
//!
//! Drives the full router over an in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use warehouse_manager::config::{
    Config, DatabaseConfig, LedgerConfig, PagingConfig, ServerConfig, StorageBackend,
    StorageConfig,
};
use warehouse_manager::services::MissingVehiclePolicy;
use warehouse_manager::store::MemoryStore;
use warehouse_manager::{create_app, AppState};

fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/unused".to_string(),
            max_connections: 1,
            min_connections: 0,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            seed_sample: true,
        },
        ledger: LedgerConfig {
            missing_vehicle: MissingVehiclePolicy::ZeroTare,
        },
        paging: PagingConfig::default(),
    }
}

async fn seeded_app() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), test_config());
    state.repository.initialize(true).await.unwrap();
    create_app(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = seeded_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "connected");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_list_first_page() {
    let app = seeded_app().await;
    let (status, body) = send(&app, "GET", "/api/v1/stocks", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["total_items"], 6);
    assert_eq!(body["pagination"]["total_pages"], 2);
}

#[tokio::test]
async fn test_list_out_of_range_redirects() {
    let app = seeded_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/clients?page=4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/api/v1/clients?page=1"
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/clients?page=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/api/v1/clients");
}

#[tokio::test]
async fn test_unknown_kind_is_rejected() {
    let app = seeded_app().await;
    let (status, _) = send(&app, "GET", "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_incoming_updates_balance() {
    let app = seeded_app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/incomings",
        Some(json!({
            "client_id": 1,
            "stock_id": 1,
            "vehicle_id": 1,
            "driver_id": 1,
            "gross_weight": 14000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["kind"], "incoming");
    assert_eq!(created["data"]["net_weight"], 800);

    let (status, balance) = send(&app, "GET", "/api/v1/stocks/1/balance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["balance"], 850);
}

#[tokio::test]
async fn test_create_rejects_invalid_payload() {
    let app = seeded_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/vehicles",
        Some(json!({ "plate1": "AB1C23", "tare": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PAYLOAD");
}

#[tokio::test]
async fn test_shipping_to_missing_stock_is_not_found() {
    let app = seeded_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/shippings",
        Some(json!({
            "client_id": 1,
            "stock_id": 99,
            "vehicle_id": 1,
            "driver_id": 1,
            "gross_weight": 14000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ENTITY_NOT_FOUND");
}

#[tokio::test]
async fn test_update_and_delete() {
    let app = seeded_app().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/clients/2",
        Some(json!({ "name": "Renamed", "address": "Rua 2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "applied");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/stocks/2",
        Some(json!({ "client_id": 2, "product_id": 2, "balance": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "ignored");

    let (status, _) = send(&app, "DELETE", "/api/v1/drivers/4", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", "/api/v1/drivers/4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reverse_movement() {
    let app = seeded_app().await;
    send(
        &app,
        "POST",
        "/api/v1/enhancements",
        Some(json!({
            "base_stock_id": 1,
            "final_stock_id": 4,
            "vehicle_id": 1,
            "gross_weight": 13300
        })),
    )
    .await;

    let (_, before) = send(&app, "GET", "/api/v1/stocks/4/balance", None).await;
    assert_eq!(before["balance"], 150);

    let (status, _) = send(&app, "POST", "/api/v1/enhancements/1/reverse", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = send(&app, "GET", "/api/v1/stocks/4/balance", None).await;
    assert_eq!(after["balance"], 50);
}

#[tokio::test]
async fn test_details_include_references() {
    let app = seeded_app().await;
    let (status, body) = send(&app, "GET", "/api/v1/stocks/5", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity"]["data"]["balance"], 50);
    let related = body["related"].as_array().unwrap();
    assert_eq!(related.len(), 2);
    assert_eq!(related[0]["kind"], "client");
    assert_eq!(related[1]["kind"], "product");
}
