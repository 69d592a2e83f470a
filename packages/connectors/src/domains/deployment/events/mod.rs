//! Deployment events - wire format of everything on the bus
//!
//! Flow:
//!   *.asset.status_changed (approved) → deploy per platform
//!     → asset.deployment_status_changed (one per platform, completion order)
//!     → asset.status_changed (deployed | failed, exactly once, last)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::IntoNatsPayload;
use crate::domains::deployment::models::{
    AggregateOutcome, AssetStatus, ContentType, DeploymentRequest, DeploymentResult, Metadata,
    Platform,
};

pub const ASSET_STATUS_CHANGED: &str = "asset.status_changed";
pub const ASSET_DEPLOYMENT_STATUS_CHANGED: &str = "asset.deployment_status_changed";

/// Asset status transition; inbound as the approval trigger, outbound as the
/// aggregate verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStatusChangedEvent {
    #[serde(default = "asset_status_changed_type")]
    pub event_type: String,
    pub asset_id: Uuid,
    pub project_id: Uuid,
    pub strategy_id: Uuid,
    pub status: AssetStatus,
    pub prev_status: AssetStatus,
    pub content_type: ContentType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(
        default,
        deserialize_with = "crate::domains::deployment::models::asset::null_as_default"
    )]
    pub metadata: Metadata,
    pub timestamp: DateTime<Utc>,
}

fn asset_status_changed_type() -> String {
    ASSET_STATUS_CHANGED.to_string()
}

impl AssetStatusChangedEvent {
    pub fn is_approval(&self) -> bool {
        self.status == AssetStatus::Approved
    }

    /// Adapter input for one platform.
    pub fn deployment_request(&self, platform: Platform) -> DeploymentRequest {
        DeploymentRequest {
            asset_id: self.asset_id,
            project_id: self.project_id,
            strategy_id: self.strategy_id,
            platform,
            content_type: self.content_type,
            title: self.title.clone(),
            content: self.content.clone(),
            metadata: self.metadata.clone(),
            created_at: Utc::now(),
        }
    }

    /// Aggregate verdict for this approval, carrying the inbound fields.
    pub fn with_outcome(&self, outcome: AggregateOutcome) -> Self {
        Self {
            event_type: ASSET_STATUS_CHANGED.to_string(),
            asset_id: self.asset_id,
            project_id: self.project_id,
            strategy_id: self.strategy_id,
            status: outcome.asset_status(),
            prev_status: AssetStatus::Approved,
            content_type: self.content_type,
            title: self.title.clone(),
            content: self.content.clone(),
            metadata: self.metadata.clone(),
            timestamp: Utc::now(),
        }
    }
}

impl IntoNatsPayload for AssetStatusChangedEvent {
    fn subject_suffix(&self) -> &'static str {
        ASSET_STATUS_CHANGED
    }
}

/// One platform's outcome for an approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatusChangedEvent {
    pub event_type: String,
    pub asset_id: Uuid,
    pub project_id: Uuid,
    pub strategy_id: Uuid,
    pub platform: Platform,
    pub status: AssetStatus,
    pub prev_status: AssetStatus,
    pub deployment_result: DeploymentResult,
    pub timestamp: DateTime<Utc>,
}

impl DeploymentStatusChangedEvent {
    pub fn from_result(source: &AssetStatusChangedEvent, result: DeploymentResult) -> Self {
        Self {
            event_type: ASSET_DEPLOYMENT_STATUS_CHANGED.to_string(),
            asset_id: source.asset_id,
            project_id: source.project_id,
            strategy_id: source.strategy_id,
            platform: result.platform,
            status: result.status.asset_status(),
            prev_status: AssetStatus::Approved,
            deployment_result: result,
            timestamp: Utc::now(),
        }
    }
}

impl IntoNatsPayload for DeploymentStatusChangedEvent {
    fn subject_suffix(&self) -> &'static str {
        ASSET_DEPLOYMENT_STATUS_CHANGED
    }
}
