//! Dependency health checks.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use tokio::time::timeout;

use crate::kernel::ServerDeps;

pub const HEALTHY: &str = "healthy";

/// Key used for the event bus entry
pub const EVENT_BUS: &str = "nats";

/// Checks every platform adapter and the event bus.
#[derive(Clone)]
pub struct HealthAggregator {
    deps: ServerDeps,
    check_timeout: Duration,
}

impl HealthAggregator {
    pub fn new(deps: ServerDeps, check_timeout: Duration) -> Self {
        Self {
            deps,
            check_timeout,
        }
    }

    /// Map of dependency name to `"healthy"` or `"unhealthy: <detail>"`.
    pub async fn check(&self) -> BTreeMap<String, String> {
        let platform_checks = self.deps.platforms.iter().map(|(platform, adapter)| async move {
            let status = self.bounded(adapter.health_check()).await;
            (platform.as_str().to_string(), status)
        });

        let bus_check = async {
            let status = self.bounded(self.deps.nats.health_check()).await;
            (EVENT_BUS.to_string(), status)
        };

        let (mut platforms, bus) = tokio::join!(join_all(platform_checks), bus_check);
        platforms.push(bus);
        platforms.into_iter().collect()
    }

    async fn bounded<F>(&self, check: F) -> String
    where
        F: Future<Output = Result<()>>,
    {
        match timeout(self.check_timeout, check).await {
            Ok(Ok(())) => HEALTHY.to_string(),
            Ok(Err(e)) => format!("unhealthy: {:#}", e),
            Err(_) => format!(
                "unhealthy: health check timed out after {:?}",
                self.check_timeout
            ),
        }
    }
}

/// True when every entry reports healthy.
pub fn all_healthy(statuses: &BTreeMap<String, String>) -> bool {
    statuses.values().all(|status| status == HEALTHY)
}
