use axum::{extract::Extension, Json};

use crate::domains::deployment::activities::DeploymentStatsSnapshot;
use crate::server::app::AppState;

/// Lifetime deployment statistics
pub async fn metrics_handler(
    Extension(state): Extension<AppState>,
) -> Json<DeploymentStatsSnapshot> {
    Json(state.stats.snapshot())
}
