//! shelfsync-rc library - catalog reconciliation service
//!
//! Compares the storefront catalog feed against the stock inventory feed and
//! reports catalog products whose name matches no inventory entry.

pub mod api;
pub mod compare;
pub mod error;
pub mod pipeline;
pub mod services;

pub use crate::error::{ApiError, ApiResult};
pub use crate::pipeline::{CompareSettings, ReconcilePipeline, ReconcileReport};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
///
/// Holds no per-run data: every `/process` request builds its own key set
/// and catalog batches (unless the key-set cache is enabled in the pipeline).
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReconcilePipeline>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: ReconcilePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::process_routes())
        .merge(api::health_routes())
        .route("/build_info", get(api::get_build_info))
        .fallback(api::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
