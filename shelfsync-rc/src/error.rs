//! Error types for shelfsync-rc HTTP handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Reconciliation run failed at any stage (500)
    #[error("Data processing failed: {0}")]
    Pipeline(#[from] shelfsync_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Pipeline(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.kind_code()),
        };
        let message = self.to_string();

        let body = Json(json!({
            "status": status.as_u16(),
            "message": message,
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
