//! Reconciliation endpoint
//!
//! GET /process runs the full fetch → fetch → compare pipeline and returns
//! the catalog identifiers that have no inventory match.

use axum::{extract::State, http::Uri, routing::get, Json, Router};
use serde::Serialize;
use tracing::error;

use crate::compare::CatalogId;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Success envelope of a reconciliation run
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: u16,
    pub message: String,
    pub unique_ids: Vec<CatalogId>,
    pub unique_count: usize,
    /// Wall-clock seconds
    pub processing_time: f64,
}

/// GET /process
pub async fn process_data(State(state): State<AppState>) -> ApiResult<Json<ProcessResponse>> {
    let report = state.pipeline.run().await.map_err(|e| {
        error!(code = e.kind_code(), "Reconciliation run failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(ProcessResponse {
        status: 200,
        message: "Data processing completed successfully".to_string(),
        unique_count: report.unique_count,
        unique_ids: report.unique_ids,
        processing_time: report.processing_time,
    }))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

/// Build reconciliation routes
pub fn process_routes() -> Router<AppState> {
    Router::new().route("/process", get(process_data))
}
