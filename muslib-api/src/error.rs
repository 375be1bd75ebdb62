//! Error types for muslib-api
//!
//! Every failure leaves the service through [`ApiError`], which picks the
//! status code, logs the detail, and renders a one-line `{"error": ...}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::ServiceError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Song service failure, mapped per variant
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    /// Status code and client-facing message
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Service(err) => match err {
                ServiceError::InvalidRequest(msg) => {
                    (StatusCode::BAD_REQUEST, format!("Invalid request: {}", msg))
                }
                ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Song not found".to_string()),
                ServiceError::EnrichmentRejected(_) => (
                    StatusCode::BAD_REQUEST,
                    "Failed to get song details".to_string(),
                ),
                ServiceError::EnrichmentUnavailable(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch song details".to_string(),
                ),
                ServiceError::EnrichmentFailed(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to parse song details".to_string(),
                ),
                ServiceError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
        }

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
