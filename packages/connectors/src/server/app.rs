//! Application setup and server configuration.

use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::domains::deployment::activities::{DeploymentStats, HealthAggregator};
use crate::server::routes::{health_handler, metrics_handler, ready_handler, root_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health: HealthAggregator,
    pub stats: Arc<DeploymentStats>,
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
