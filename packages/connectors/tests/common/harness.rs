//! Test harness wiring the orchestrator to mock platforms and a recording bus.

use std::sync::Arc;
use std::time::Duration;

use connectors_core::domains::deployment::activities::DeploymentOrchestrator;
use connectors_core::domains::deployment::models::Platform;
use connectors_core::kernel::{MockPlatformAdapter, TestDependencies};
use connectors_core::DeploymentConfig;

pub struct TestHarness {
    pub deps: TestDependencies,
    pub google_ads: Arc<MockPlatformAdapter>,
    pub meta: Arc<MockPlatformAdapter>,
    pub orchestrator: DeploymentOrchestrator,
}

impl TestHarness {
    pub fn new(google_ads: MockPlatformAdapter, meta: MockPlatformAdapter) -> Self {
        Self::with_config(google_ads, meta, fast_retries(3))
    }

    pub fn with_config(
        google_ads: MockPlatformAdapter,
        meta: MockPlatformAdapter,
        config: DeploymentConfig,
    ) -> Self {
        init_tracing();

        let google_ads = Arc::new(google_ads);
        let meta = Arc::new(meta);
        let deps = TestDependencies::new()
            .with_adapter(google_ads.clone())
            .with_adapter(meta.clone())
            .with_config(config);
        let orchestrator = DeploymentOrchestrator::new(deps.server_deps());

        Self {
            deps,
            google_ads,
            meta,
            orchestrator,
        }
    }

    /// Both platforms configured and healthy
    pub fn healthy() -> Self {
        Self::new(
            MockPlatformAdapter::new(Platform::GoogleAds),
            MockPlatformAdapter::new(Platform::Meta),
        )
    }
}

pub fn fast_retries(attempts: u32) -> DeploymentConfig {
    DeploymentConfig {
        max_retry_attempts: attempts,
        retry_delay: Duration::from_millis(10),
        per_attempt_timeout: Duration::from_secs(1),
    }
}

// Run tests with: RUST_LOG=debug cargo test -- --nocapture
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
