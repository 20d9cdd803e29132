//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/sessions", post(create_session_handler))
        .route("/sessions/:id", get(session_handler).delete(delete_session_handler))
        .route("/sessions/:id/start", post(start_handler))
        .route("/sessions/:id/pause", post(pause_handler))
        .route("/sessions/:id/resume", post(resume_handler))
        .route("/sessions/:id/skip", post(skip_handler))
        .route("/sessions/:id/reset", post(reset_handler))
        .route("/sessions/:id/reset-counters", post(reset_counters_handler))
        .route("/sessions/:id/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
