//! HTTP surface for the revision metadata engine.

pub mod error;
pub mod handlers;
pub mod state;
pub mod tracing_init;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

/// Builds the full router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/api/v1/events/snapshot-persisted",
            post(handlers::snapshot_persisted),
        )
        .route(
            "/api/v1/events/restore-requested",
            post(handlers::restore_requested),
        )
        .route(
            "/api/v1/admin/settings",
            get(handlers::get_settings).post(handlers::save_settings),
        )
        .route(
            "/api/v1/snapshots/:snapshot_id/review",
            get(handlers::review_snapshot),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
