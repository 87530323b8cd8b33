//! HTTP surface for serve mode

pub mod handlers;
pub mod state;

pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the router with its tracing and concurrency-limit layers
pub fn create_router(state: AppState, max_concurrent: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/v1/pipeline/run", post(handlers::run_pipeline))
        .layer(ConcurrencyLimitLayer::new(max_concurrent.max(1)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
