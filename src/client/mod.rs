//! HTTP client for the workshop API.
//!
//! Configuration is via environment variables:
//! - `WORKSHOP_URL` - Base URL (default: `http://localhost:3001`)
//! - `WORKSHOP_API_KEY` - Shared key sent as `X-API-Key` (optional)
//!
//! Every mutation is fire-and-refetch: callers apply a change here and then
//! ask their [`Poller`] for a fresh snapshot instead of patching local state.

mod poller;
pub mod views;

pub use poller::{PollState, Poller, COLLECTION_INTERVAL, HEALTH_INTERVAL};

use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::{CursorResponse, HealthResponse, API_KEY_HEADER};
use crate::models::{Entity, Learning, CURSOR_FIELD};
use crate::store::Document;

/// Default URL for local development.
const DEFAULT_URL: &str = "http://localhost:3001";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// HTTP client for the workshop API.
#[derive(Debug, Clone)]
pub struct WorkshopClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl WorkshopClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("WORKSHOP_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let api_key = std::env::var("WORKSHOP_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        Self::new(base_url, api_key)
    }

    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with optional auth header.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }
        req
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);

        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
            StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(message)),
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            StatusCode::CONFLICT => Err(ClientError::Conflict(message)),
            _ => Err(ClientError::Server(format!("{}: {}", status, message))),
        }
    }

    // ============================================================
    // Health
    // ============================================================

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.request(Method::GET, "/health").send().await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Collections
    // ============================================================

    /// Fetch a whole collection.
    pub async fn list<E: Entity>(&self) -> Result<Document<E>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/api/{}", E::COLLECTION))
            .send()
            .await?;
        let value: Value = self.handle_response(response).await?;
        Document::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Create a record from its domain fields.
    pub async fn create<E: Entity>(&self, input: &impl Serialize) -> Result<E, ClientError> {
        let response = self
            .request(Method::POST, &format!("/api/{}", E::COLLECTION))
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Change only the fields present in `patch`.
    pub async fn update<E: Entity>(
        &self,
        id: &str,
        patch: &impl Serialize,
    ) -> Result<E, ClientError> {
        let response = self
            .request(Method::PUT, &format!("/api/{}/{}", E::COLLECTION, id))
            .json(patch)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Delete by id. Deleting an unknown id succeeds.
    pub async fn delete<E: Entity>(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/api/{}", E::COLLECTION))
            .query(&[("id", id)])
            .send()
            .await?;
        let _: Value = self.handle_response(response).await?;
        Ok(())
    }

    // ============================================================
    // Learnings cursor
    // ============================================================

    pub async fn set_bookmark_cursor(
        &self,
        cursor: Option<&str>,
    ) -> Result<Option<String>, ClientError> {
        let mut body = Map::new();
        body.insert(
            CURSOR_FIELD.to_string(),
            cursor.map_or(Value::Null, |c| Value::String(c.to_string())),
        );

        let response = self
            .request(Method::PUT, &format!("/api/{}", Learning::COLLECTION))
            .json(&body)
            .send()
            .await?;
        let body: CursorResponse = self.handle_response(response).await?;
        Ok(body.last_checked_bookmark_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = WorkshopClient::new("http://localhost:3001/", None);
        assert_eq!(client.base_url(), "http://localhost:3001");
    }
}
