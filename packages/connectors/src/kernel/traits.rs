// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Retry policy, fan-out and aggregation live in the deployment domain and only
// ever talk to platforms through these traits.
//
// Naming convention: Base* for trait names (e.g., BasePlatformAdapter)

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::deployment::models::{DeploymentRequest, Platform, PlatformReceipt};

// =============================================================================
// Platform Adapter Trait (Infrastructure - one per advertising platform)
// =============================================================================

#[async_trait]
pub trait BasePlatformAdapter: Send + Sync {
    /// Which platform this adapter deploys to
    fn platform(&self) -> Platform;

    /// Create the campaign/ad for one asset.
    ///
    /// Callers bound this with a timeout and drop the future when it expires,
    /// so implementations must not rely on running to completion.
    async fn deploy(&self, request: &DeploymentRequest) -> Result<PlatformReceipt>;

    /// Check the platform API (credentials, reachability)
    async fn health_check(&self) -> Result<()>;
}
