//! API route definitions

use super::handlers::{self, ApiState};
use super::ws_handlers;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Real-time change notifications
        .route("/ws/events", get(ws_handlers::ws_events))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
