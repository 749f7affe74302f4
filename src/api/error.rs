use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::service::ServiceError;

/// Error returned by collection handlers, rendered as `{ "error": "..." }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("ID required")]
    MissingId,

    #[error("{0}")]
    Invalid(String),

    #[error("{0} already exists")]
    Conflict(&'static str),

    /// The body is not JSON, or not sent as JSON.
    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Invalid(msg) => Self::Invalid(msg),
            ServiceError::Duplicate(name) => Self::Conflict(name),
            ServiceError::Storage(e) => Self::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingId | Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Body(rejection) => rejection.status(),
            Self::Internal(e) => {
                // The full error stays in the log; clients get a generic message.
                tracing::error!("Internal error: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_client_error() {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
