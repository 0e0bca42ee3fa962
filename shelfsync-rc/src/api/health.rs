//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
    /// Module name ("shelfsync-rc")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Current time, RFC 3339
    pub timestamp: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
}

/// GET /health
///
/// Liveness and version for monitoring. Touches no upstream feed.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    let uptime_seconds = now
        .signed_duration_since(state.startup_time)
        .num_seconds()
        .max(0) as u64;

    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "shelfsync-rc".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now.to_rfc3339(),
        uptime_seconds,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
