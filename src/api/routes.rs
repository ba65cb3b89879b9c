use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{fail_unhandled, fail_with_code, fail_with_value, health};
use super::middleware::{handle_errors, logging_middleware};
use crate::metrics;
use crate::responder::ErrorResponder;

pub fn create_router(responder: Arc<ErrorResponder>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Failing endpoints
        .route("/errors", post(fail_with_value))
        .route("/errors/unhandled", get(fail_unhandled))
        .route("/errors/:code", get(fail_with_code))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        // Error rendering sits innermost so logging and tracing see the final status
        .layer(middleware::from_fn_with_state(responder, handle_errors))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
