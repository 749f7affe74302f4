mod learnings;

pub use learnings::*;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;
use crate::models::{self, Entity};
use crate::service::Collection;
use crate::store::{Document, Store};

// ============================================================
// Health
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: models::timestamp(models::now()),
    })
}

// ============================================================
// Collections
// ============================================================

/// Query string of `DELETE /api/{collection}?id=...`.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub async fn list<E: Entity>(State(store): State<Store>) -> Json<Document<E>> {
    Json(Collection::<E>::new(store).list())
}

pub async fn create<E: Entity>(
    State(store): State<Store>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<E>), ApiError> {
    let Json(body) = body?;
    let record = Collection::<E>::new(store).create(body)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /api/{collection}` with the id in the body.
pub async fn update<E: Entity>(
    State(store): State<Store>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<E>, ApiError> {
    let Json(body) = body?;
    let id = body_id(&body).ok_or(ApiError::MissingId)?;
    merge::<E>(store, &id, body)
}

/// `PUT /api/{collection}/{id}`. The path id wins over any id in the body.
pub async fn update_by_path<E: Entity>(
    State(store): State<Store>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<E>, ApiError> {
    let Json(body) = body?;
    merge::<E>(store, &id, body)
}

pub async fn delete<E: Entity>(
    State(store): State<Store>,
    Query(query): Query<IdQuery>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingId)?;
    remove::<E>(store, &id)
}

pub async fn delete_by_path<E: Entity>(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    remove::<E>(store, &id)
}

fn merge<E: Entity>(store: Store, id: &str, body: Value) -> Result<Json<E>, ApiError> {
    Collection::<E>::new(store)
        .update(id, body)?
        .map(Json)
        .ok_or(ApiError::NotFound(E::NAME))
}

/// Deleting an id that is not there is still a success.
fn remove<E: Entity>(store: Store, id: &str) -> Result<Json<SuccessResponse>, ApiError> {
    Collection::<E>::new(store).delete(id)?;
    Ok(Json(SuccessResponse { success: true }))
}

fn body_id(body: &Value) -> Option<String> {
    body.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
