//! Server dependencies for the deployment domain (using traits for testability)
//!
//! This module provides the central dependency container shared by the
//! orchestrator, the health aggregator and the HTTP routes. All external
//! services sit behind trait objects so tests can swap in mocks.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::DeploymentConfig;
use crate::domains::deployment::activities::DeploymentStats;
use crate::domains::deployment::models::Platform;
use crate::kernel::{BasePlatformAdapter, NatsPublisher};

// =============================================================================
// PlatformRegistry
// =============================================================================

/// Lookup table of configured platform adapters, keyed by platform.
#[derive(Clone, Default)]
pub struct PlatformRegistry {
    adapters: BTreeMap<Platform, Arc<dyn BasePlatformAdapter>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own platform, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn BasePlatformAdapter>) {
        self.adapters.insert(adapter.platform(), adapter);
    }

    pub fn get(&self, platform: Platform) -> Option<&Arc<dyn BasePlatformAdapter>> {
        self.adapters.get(&platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Platform, &Arc<dyn BasePlatformAdapter>)> {
        self.adapters.iter().map(|(platform, adapter)| (*platform, adapter))
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies shared by every in-flight approval
#[derive(Clone)]
pub struct ServerDeps {
    pub nats: Arc<dyn NatsPublisher>,
    pub platforms: PlatformRegistry,
    pub deployment: DeploymentConfig,
    /// Lifetime counters surfaced on /metrics
    pub stats: Arc<DeploymentStats>,
    /// Prepended to outbound subjects when non-empty
    pub subject_prefix: String,
}

impl ServerDeps {
    pub fn new(
        nats: Arc<dyn NatsPublisher>,
        platforms: PlatformRegistry,
        deployment: DeploymentConfig,
    ) -> Self {
        Self {
            nats,
            platforms,
            deployment,
            stats: Arc::new(DeploymentStats::new()),
            subject_prefix: String::new(),
        }
    }

    pub fn with_subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MockPlatformAdapter;

    #[test]
    fn test_registry_keys_by_adapter_platform() {
        let mut registry = PlatformRegistry::new();
        registry.register(Arc::new(MockPlatformAdapter::new(Platform::Meta)));
        registry.register(Arc::new(MockPlatformAdapter::new(Platform::GoogleAds)));
        registry.register(Arc::new(MockPlatformAdapter::new(Platform::Meta)));

        assert_eq!(registry.len(), 2);
        assert!(registry.get(Platform::Meta).is_some());
        assert_eq!(
            registry.iter().map(|(platform, _)| platform).collect::<Vec<_>>(),
            vec![Platform::GoogleAds, Platform::Meta]
        );
    }
}
