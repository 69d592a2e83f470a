//! Deployment requests, per-platform results and the aggregate verdict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::asset::{AssetStatus, ContentType, Metadata};
use super::platform::Platform;

/// What a platform adapter is asked to deploy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub asset_id: Uuid,
    pub project_id: Uuid,
    pub strategy_id: Uuid,
    pub platform: Platform,
    pub content_type: ContentType,
    pub title: String,
    pub content: String,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

/// What a platform hands back after a successful deploy call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformReceipt {
    /// External campaign/ad identifier.
    pub platform_id: String,
    pub platform_url: Option<String>,
    pub data_sent: u64,
    pub data_received: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Success,
    Failed,
}

impl DeploymentStatus {
    /// Asset status reported in the per-platform event.
    pub fn asset_status(&self) -> AssetStatus {
        match self {
            DeploymentStatus::Success => AssetStatus::Deployed,
            DeploymentStatus::Failed => AssetStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentMetrics {
    /// Wall time across every attempt, serialized as integer nanoseconds.
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    pub retry_count: u32,
    pub data_sent: u64,
    pub data_received: u64,
}

/// Outcome of one platform's retry sequence for one approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub asset_id: Uuid,
    pub platform: Platform,
    pub status: DeploymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metrics: DeploymentMetrics,
}

impl DeploymentResult {
    pub fn succeeded(
        asset_id: Uuid,
        platform: Platform,
        receipt: PlatformReceipt,
        attempts: u32,
        duration: Duration,
    ) -> Self {
        Self {
            asset_id,
            platform,
            status: DeploymentStatus::Success,
            platform_id: Some(receipt.platform_id),
            platform_url: receipt.platform_url,
            deployed_at: Some(Utc::now()),
            error: None,
            metrics: DeploymentMetrics {
                duration,
                retry_count: attempts.saturating_sub(1),
                data_sent: receipt.data_sent,
                data_received: receipt.data_received,
            },
        }
    }

    pub fn failed(
        asset_id: Uuid,
        platform: Platform,
        error: String,
        attempts: u32,
        duration: Duration,
    ) -> Self {
        Self {
            asset_id,
            platform,
            status: DeploymentStatus::Failed,
            platform_id: None,
            platform_url: None,
            deployed_at: None,
            error: Some(error),
            metrics: DeploymentMetrics {
                duration,
                retry_count: attempts.saturating_sub(1),
                ..Default::default()
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DeploymentStatus::Success
    }

    /// Number of adapter calls actually made.
    pub fn attempts(&self) -> u32 {
        self.metrics.retry_count + 1
    }
}

/// Single verdict for an approval across all attempted platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOutcome {
    Deployed,
    Failed,
}

impl AggregateOutcome {
    /// `Deployed` only when every result succeeded.
    pub fn from_results(results: &[DeploymentResult]) -> Self {
        if results.iter().all(DeploymentResult::is_success) {
            AggregateOutcome::Deployed
        } else {
            AggregateOutcome::Failed
        }
    }

    pub fn asset_status(&self) -> AssetStatus {
        match self {
            AggregateOutcome::Deployed => AssetStatus::Deployed,
            AggregateOutcome::Failed => AssetStatus::Failed,
        }
    }
}

mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}
