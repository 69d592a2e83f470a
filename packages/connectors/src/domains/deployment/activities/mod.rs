pub mod health;
pub mod orchestrator;
pub mod retry;
pub mod stats;

pub use health::{all_healthy, HealthAggregator, EVENT_BUS, HEALTHY};
pub use orchestrator::DeploymentOrchestrator;
pub use retry::{AttemptError, RetryExecutor};
pub use stats::{DeploymentStats, DeploymentStatsSnapshot, PlatformStats};
