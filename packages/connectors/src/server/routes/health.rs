use std::collections::BTreeMap;

use axum::{extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::deployment::activities::all_healthy;
use crate::server::app::AppState;

pub const SERVICE_NAME: &str = "ZAMC Ad Deployment Connectors";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub services: BTreeMap<String, String>,
}

/// Health check endpoint
///
/// Checks every configured platform adapter and the event bus, each bounded
/// by the health check timeout. Returns 200 OK if all of them are healthy,
/// 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let services = state.health.check().await;
    let healthy = all_healthy(&services);

    let (status_code, status) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            timestamp: Utc::now(),
            version: SERVICE_VERSION.to_string(),
            services,
        }),
    )
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Readiness endpoint; the process is ready once it serves HTTP.
pub async fn ready_handler() -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready".to_string(),
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub service: String,
    pub version: String,
    pub description: String,
    pub endpoints: BTreeMap<String, String>,
}

pub async fn root_handler() -> Json<ServiceDescriptor> {
    let endpoints = [("health", "/health"), ("metrics", "/metrics"), ("ready", "/ready")]
        .into_iter()
        .map(|(name, path)| (name.to_string(), path.to_string()))
        .collect();

    Json(ServiceDescriptor {
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
        description: "Deploys approved assets to Google Ads and Meta Marketing platforms"
            .to_string(),
        endpoints,
    })
}
