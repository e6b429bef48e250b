//! HTTP handlers for the generic entity endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{Entity, EntityKind, PaginatedResponse};

use crate::error::AppResult;
use crate::services::{EntityDetails, PageOutcome, UpdateOutcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Raw page number; anything unparseable means the first page
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub kind: EntityKind,
    pub id: i32,
    pub outcome: UpdateOutcome,
}

/// Canonical listing URL of a kind, optionally at a given page
pub fn listing_url(kind: EntityKind, page: Option<i64>) -> String {
    match page {
        Some(page) => format!("/api/v1/{}?page={}", kind.path(), page),
        None => format!("/api/v1/{}", kind.path()),
    }
}

/// List one page of a kind, redirecting when the page is out of range
pub async fn list_entities(
    State(state): State<AppState>,
    Path(kind): Path<EntityKind>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let outcome = state
        .listing
        .list_page(kind, query.page.as_deref(), None)
        .await?;

    let response = match outcome {
        PageOutcome::Page { items, paging } => Json(PaginatedResponse {
            data: items,
            pagination: paging,
        })
        .into_response(),
        PageOutcome::Redirect { page } => Redirect::to(&listing_url(kind, page)).into_response(),
    };
    Ok(response)
}

/// Create an entity from a JSON payload
pub async fn create_entity(
    State(state): State<AppState>,
    Path(kind): Path<EntityKind>,
    Json(payload): Json<serde_json::Value>,
) -> AppResult<(StatusCode, Json<Entity>)> {
    let entity = kind.parse_payload(payload)?;
    let created = state.repository.create(entity).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get an entity with the records it references
pub async fn get_entity(
    State(state): State<AppState>,
    Path((kind, id)): Path<(EntityKind, i32)>,
) -> AppResult<Json<EntityDetails>> {
    let details = state.listing.details(kind, id).await?;
    Ok(Json(details))
}

/// Overwrite an entity
pub async fn update_entity(
    State(state): State<AppState>,
    Path((kind, id)): Path<(EntityKind, i32)>,
    Json(payload): Json<serde_json::Value>,
) -> AppResult<Json<UpdateResponse>> {
    let mut entity = kind.parse_payload(payload)?;
    entity.set_id(id);
    let outcome = state.repository.update(entity).await?;
    Ok(Json(UpdateResponse { kind, id, outcome }))
}

/// Delete an entity; movements keep their balance effect
pub async fn delete_entity(
    State(state): State<AppState>,
    Path((kind, id)): Path<(EntityKind, i32)>,
) -> AppResult<StatusCode> {
    state.repository.delete(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
