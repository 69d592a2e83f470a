// TestDependencies - mock implementations for testing
//
// Provides scripted platform adapters that can be registered in ServerDeps
// for unit and integration tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BasePlatformAdapter, NatsPublisher, PlatformRegistry, ServerDeps, TestNats};
use crate::config::DeploymentConfig;
use crate::domains::deployment::models::{DeploymentRequest, Platform, PlatformReceipt};

// =============================================================================
// Mock Platform Adapter
// =============================================================================

/// Platform adapter with scripted behavior.
///
/// By default every deploy succeeds immediately. Use the builder methods to
/// add deploy or health latency, fail every call, fail the first N calls, or
/// fail health checks.
pub struct MockPlatformAdapter {
    platform: Platform,
    latency: Duration,
    health_latency: Duration,
    always_fail: bool,
    fail_first: u32,
    unhealthy: AtomicBool,
    calls: AtomicU32,
    requests: Mutex<Vec<DeploymentRequest>>,
}

impl MockPlatformAdapter {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            latency: Duration::ZERO,
            health_latency: Duration::ZERO,
            always_fail: false,
            fail_first: 0,
            unhealthy: AtomicBool::new(false),
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every deploy call fails
    pub fn failing(mut self) -> Self {
        self.always_fail = true;
        self
    }

    /// The first `n` deploy calls fail, later ones succeed
    pub fn fail_first(mut self, n: u32) -> Self {
        self.fail_first = n;
        self
    }

    /// Each deploy call sleeps this long before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Each health check sleeps this long before answering
    pub fn with_health_latency(mut self, latency: Duration) -> Self {
        self.health_latency = latency;
        self
    }

    /// Health checks fail
    pub fn unhealthy(self) -> Self {
        self.unhealthy.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    /// Number of deploy calls started (including ones that timed out)
    pub fn deploy_calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests that completed successfully
    pub fn deployments(&self) -> Vec<DeploymentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl BasePlatformAdapter for MockPlatformAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn deploy(&self, request: &DeploymentRequest) -> Result<PlatformReceipt> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.always_fail || call <= self.fail_first {
            return Err(anyhow!("mock {} deployment failure", self.platform));
        }

        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        Ok(PlatformReceipt {
            platform_id: format!("{}_{}", self.platform, request.asset_id.simple()),
            platform_url: Some(format!("https://ads.example.com/{}/{}", self.platform, call)),
            data_sent: 1024,
            data_received: 512,
        })
    }

    async fn health_check(&self) -> Result<()> {
        if !self.health_latency.is_zero() {
            tokio::time::sleep(self.health_latency).await;
        }

        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(anyhow!("mock {} health check failed", self.platform));
        }
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Builder for ServerDeps wired to mocks.
pub struct TestDependencies {
    pub nats: Arc<TestNats>,
    pub registry: PlatformRegistry,
    pub config: DeploymentConfig,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            nats: Arc::new(TestNats::new()),
            registry: PlatformRegistry::new(),
            config: DeploymentConfig {
                max_retry_attempts: 3,
                retry_delay: Duration::from_millis(10),
                per_attempt_timeout: Duration::from_secs(1),
            },
        }
    }

    pub fn with_adapter(mut self, adapter: Arc<MockPlatformAdapter>) -> Self {
        self.registry.register(adapter);
        self
    }

    pub fn with_config(mut self, config: DeploymentConfig) -> Self {
        self.config = config;
        self
    }

    /// Build ServerDeps; `self.nats` stays available for assertions.
    pub fn server_deps(&self) -> ServerDeps {
        let nats: Arc<dyn NatsPublisher> = self.nats.clone();
        ServerDeps::new(nats, self.registry.clone(), self.config.clone())
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
