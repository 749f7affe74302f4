//! Learnings differ from the other collections in one respect: the document
//! also carries the bookmark cursor of the ingestion job.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{body_id, merge};
use crate::api::ApiError;
use crate::models::{Learning, CURSOR_FIELD};
use crate::service::Collection;
use crate::store::Store;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorResponse {
    pub success: bool,
    pub last_checked_bookmark_id: Option<String>,
}

pub async fn create_learning(
    State(store): State<Store>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Learning>), ApiError> {
    let Json(body) = body?;
    let learning = Collection::<Learning>::new(store).create_learning(body)?;
    Ok((StatusCode::CREATED, Json(learning)))
}

/// `PUT /api/learnings`.
///
/// A body carrying `lastCheckedBookmarkId` updates only the cursor and needs
/// no `id`; any other body is a regular record update.
pub async fn update_learning(
    State(store): State<Store>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    if let Some(cursor) = body.get(CURSOR_FIELD) {
        let cursor = Collection::<Learning>::new(store).set_cursor(cursor.clone())?;
        return Ok(Json(CursorResponse {
            success: true,
            last_checked_bookmark_id: cursor,
        })
        .into_response());
    }

    let id = body_id(&body).ok_or(ApiError::MissingId)?;
    Ok(merge::<Learning>(store, &id, body)?.into_response())
}
