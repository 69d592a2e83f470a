//! Lifetime deployment counters.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domains::deployment::models::{DeploymentResult, Platform};

#[derive(Debug, Default)]
struct PlatformCounters {
    successes: AtomicU64,
    failures: AtomicU64,
    duration_micros: AtomicU64,
}

/// Concurrent-safe deployment counters, one set per platform.
///
/// Shared by every in-flight approval; each finished platform result is
/// recorded exactly once.
#[derive(Debug, Default)]
pub struct DeploymentStats {
    counters: [PlatformCounters; Platform::ALL.len()],
}

impl DeploymentStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self, platform: Platform) -> &PlatformCounters {
        &self.counters[platform.index()]
    }

    pub fn record(&self, result: &DeploymentResult) {
        let counters = self.counters(result.platform);
        if result.is_success() {
            counters.successes.fetch_add(1, Ordering::Relaxed);
        } else {
            counters.failures.fetch_add(1, Ordering::Relaxed);
        }
        let micros = u64::try_from(result.metrics.duration.as_micros()).unwrap_or(u64::MAX);
        counters.duration_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DeploymentStatsSnapshot {
        let mut platforms = BTreeMap::new();
        let mut total = PlatformStats::default();
        let mut total_micros = 0u64;

        for platform in Platform::ALL {
            let counters = self.counters(platform);
            let successes = counters.successes.load(Ordering::Relaxed);
            let failures = counters.failures.load(Ordering::Relaxed);
            let micros = counters.duration_micros.load(Ordering::Relaxed);

            let stats = PlatformStats::new(successes, failures, micros);
            total.successes += successes;
            total.failures += failures;
            total_micros = total_micros.saturating_add(micros);
            platforms.insert(platform.as_str().to_string(), stats);
        }

        let total = PlatformStats::new(total.successes, total.failures, total_micros);
        DeploymentStatsSnapshot {
            total_deployments: total.deployments,
            successful_deployments: total.successes,
            failed_deployments: total.failures,
            success_rate: total.success_rate,
            average_duration_ms: total.average_duration_ms,
            platforms,
        }
    }
}

/// Read model served on /metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentStatsSnapshot {
    pub total_deployments: u64,
    pub successful_deployments: u64,
    pub failed_deployments: u64,
    pub success_rate: f64,
    pub average_duration_ms: f64,
    pub platforms: BTreeMap<String, PlatformStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformStats {
    pub deployments: u64,
    pub successes: u64,
    pub failures: u64,
    /// Percentage, 0 when nothing has been deployed yet
    pub success_rate: f64,
    pub average_duration_ms: f64,
}

impl PlatformStats {
    fn new(successes: u64, failures: u64, duration_micros: u64) -> Self {
        let deployments = successes + failures;
        let (success_rate, average_duration_ms) = if deployments == 0 {
            (0.0, 0.0)
        } else {
            (
                successes as f64 * 100.0 / deployments as f64,
                duration_micros as f64 / 1000.0 / deployments as f64,
            )
        };
        Self {
            deployments,
            successes,
            failures,
            success_rate,
            average_duration_ms,
        }
    }
}
