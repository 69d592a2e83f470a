//! Approval fan-out: one retrying deploy per platform, then one verdict.
//!
//! # Architecture
//!
//! ```text
//! handle_approval
//!     │
//!     ├─► filter (approved only, supported + configured platforms only)
//!     ├─► RetryExecutor per platform, concurrently
//!     │       └─► publish asset.deployment_status_changed as each finishes
//!     └─► join → AggregateOutcome → publish asset.status_changed
//! ```

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::retry::RetryExecutor;
use super::stats::DeploymentStatsSnapshot;
use crate::common::{publish_event, IntoNatsPayload, PublishError};
use crate::domains::deployment::error::DeploymentError;
use crate::domains::deployment::events::{AssetStatusChangedEvent, DeploymentStatusChangedEvent};
use crate::domains::deployment::models::{AggregateOutcome, DeploymentResult, Platform};
use crate::kernel::{BasePlatformAdapter, ServerDeps};

#[derive(Clone)]
pub struct DeploymentOrchestrator {
    deps: ServerDeps,
    executor: RetryExecutor,
}

impl DeploymentOrchestrator {
    pub fn new(deps: ServerDeps) -> Self {
        let executor = RetryExecutor::new(deps.deployment.clone());
        Self { deps, executor }
    }

    /// Counters accumulated over the process lifetime.
    pub fn deployment_stats(&self) -> DeploymentStatsSnapshot {
        self.deps.stats.snapshot()
    }

    /// Requested platforms that have a configured adapter.
    pub fn working_set(
        &self,
        event: &AssetStatusChangedEvent,
    ) -> Vec<(Platform, Arc<dyn BasePlatformAdapter>)> {
        event
            .metadata
            .requested_platforms()
            .into_iter()
            .filter_map(|platform| {
                self.deps
                    .platforms
                    .get(platform)
                    .map(|adapter| (platform, adapter.clone()))
            })
            .collect()
    }

    /// Deploy an approved asset everywhere it asked to go.
    ///
    /// Non-approved events and approvals with nothing to deploy return `Ok`
    /// without side effects. Platform failures are reported through the
    /// published events only; `Err` means the bus refused a publish.
    pub async fn handle_approval(
        &self,
        cancel: &CancellationToken,
        event: &AssetStatusChangedEvent,
    ) -> Result<(), DeploymentError> {
        if !event.is_approval() {
            debug!(
                asset_id = %event.asset_id,
                status = %event.status,
                "ignoring non-approved asset"
            );
            return Ok(());
        }

        let targets = self.working_set(event);
        if targets.is_empty() {
            info!(
                asset_id = %event.asset_id,
                requested = ?event.metadata.platforms,
                "no supported platforms to deploy to"
            );
            return Ok(());
        }

        info!(
            asset_id = %event.asset_id,
            project_id = %event.project_id,
            strategy_id = %event.strategy_id,
            content_type = %event.content_type,
            platforms = targets.len(),
            "processing approved asset"
        );

        let mut pending: FuturesUnordered<_> = targets
            .iter()
            .map(|(platform, adapter)| {
                let request = event.deployment_request(*platform);
                let executor = &self.executor;
                async move { executor.execute(cancel, adapter.as_ref(), &request).await }
            })
            .collect();

        let mut results: Vec<DeploymentResult> = Vec::with_capacity(targets.len());
        let mut publish_failure: Option<PublishError> = None;

        while let Some(result) = pending.next().await {
            self.deps.stats.record(&result);

            let status_event = DeploymentStatusChangedEvent::from_result(event, result.clone());
            if let Err(e) = self.publish(&status_event).await {
                publish_failure.get_or_insert(e);
            }
            results.push(result);
        }

        let outcome = AggregateOutcome::from_results(&results);
        let verdict = event.with_outcome(outcome);
        if let Err(e) = self.publish(&verdict).await {
            publish_failure.get_or_insert(e);
        }

        let successful = results.iter().filter(|r| r.is_success()).count();
        info!(
            asset_id = %event.asset_id,
            final_status = %verdict.status,
            deployments_count = results.len(),
            successful_deploys = successful,
            "asset deployment processing completed"
        );

        match publish_failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    async fn publish<E: IntoNatsPayload>(
        &self,
        event: &E,
    ) -> Result<(), PublishError> {
        publish_event(event, self.deps.nats.as_ref(), &self.deps.subject_prefix)
            .await
            .map(|_| ())
            .map_err(|e| {
                error!(subject = %e.subject(), error = %e, "failed to publish event");
                e
            })
    }
}
