//! Bounded retries around a single platform deploy call.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::DeploymentConfig;
use crate::domains::deployment::models::{DeploymentRequest, DeploymentResult};
use crate::kernel::BasePlatformAdapter;

/// Why a single attempt failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0:#}")]
    Platform(anyhow::Error),
}

/// Runs one platform deploy with a fixed-backoff retry loop.
///
/// Every attempt gets its own `per_attempt_timeout`; an expired attempt's
/// future is dropped. The `retry_delay` wait is paid after every failed
/// attempt except the last, timeouts included. Cancellation never interrupts
/// an attempt that is already running, but it stops any further attempt and
/// cuts a pending backoff short.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: DeploymentConfig,
}

impl RetryExecutor {
    pub fn new(config: DeploymentConfig) -> Self {
        Self { config }
    }

    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        adapter: &dyn BasePlatformAdapter,
        request: &DeploymentRequest,
    ) -> DeploymentResult {
        let platform = adapter.platform();
        let max_attempts = self.config.max_retry_attempts.max(1);
        let started = Instant::now();

        let mut attempts = 0;
        let mut last_error: Option<AttemptError> = None;
        let mut cancelled = false;

        while attempts < max_attempts {
            attempts += 1;
            info!(
                asset_id = %request.asset_id,
                platform = %platform,
                attempt = attempts,
                "attempting deployment"
            );

            match timeout(self.config.per_attempt_timeout, adapter.deploy(request)).await {
                Ok(Ok(receipt)) => {
                    info!(
                        asset_id = %request.asset_id,
                        platform = %platform,
                        attempt = attempts,
                        platform_id = %receipt.platform_id,
                        "deployment successful"
                    );
                    return DeploymentResult::succeeded(
                        request.asset_id,
                        platform,
                        receipt,
                        attempts,
                        started.elapsed(),
                    );
                }
                Ok(Err(e)) => last_error = Some(AttemptError::Platform(e)),
                Err(_) => {
                    last_error = Some(AttemptError::Timeout(self.config.per_attempt_timeout))
                }
            }

            if let Some(e) = &last_error {
                warn!(
                    asset_id = %request.asset_id,
                    platform = %platform,
                    attempt = attempts,
                    error = %e,
                    "deployment attempt failed"
                );
            }

            if attempts == max_attempts {
                break;
            }
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(self.config.retry_delay) => {}
            }
        }

        let detail = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt completed".to_string());
        let error = if cancelled {
            format!("deployment cancelled after {} attempt(s): {}", attempts, detail)
        } else {
            format!("deployment failed after {} attempt(s): {}", attempts, detail)
        };

        warn!(
            asset_id = %request.asset_id,
            platform = %platform,
            attempts,
            cancelled,
            error = %error,
            "all deployment attempts failed"
        );

        DeploymentResult::failed(request.asset_id, platform, error, attempts, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::deployment::models::{ContentType, Metadata, Platform};
    use crate::kernel::MockPlatformAdapter;
    use chrono::Utc;
    use uuid::Uuid;

    fn request(platform: Platform) -> DeploymentRequest {
        DeploymentRequest {
            asset_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            strategy_id: Uuid::new_v4(),
            platform,
            content_type: ContentType::BlogPost,
            title: "Title".to_string(),
            content: "Body".to_string(),
            metadata: Metadata::default(),
            created_at: Utc::now(),
        }
    }

    fn executor(attempts: u32, delay_ms: u64, timeout_ms: u64) -> RetryExecutor {
        RetryExecutor::new(DeploymentConfig {
            max_retry_attempts: attempts,
            retry_delay: Duration::from_millis(delay_ms),
            per_attempt_timeout: Duration::from_millis(timeout_ms),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success() {
        let adapter = MockPlatformAdapter::new(Platform::Meta);

        let result = executor(3, 100, 1000)
            .execute(&CancellationToken::new(), &adapter, &request(Platform::Meta))
            .await;

        assert!(result.is_success());
        assert_eq!(result.attempts(), 1);
        assert_eq!(adapter.deploy_calls(), 1);
        assert_eq!(adapter.deployments().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let adapter = MockPlatformAdapter::new(Platform::GoogleAds).fail_first(2);

        let result = executor(3, 100, 1000)
            .execute(&CancellationToken::new(), &adapter, &request(Platform::GoogleAds))
            .await;

        assert!(result.is_success());
        assert_eq!(result.attempts(), 3);
        assert_eq!(result.metrics.retry_count, 2);
        assert_eq!(adapter.deploy_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_exactly_max_attempts_with_backoff() {
        let adapter = MockPlatformAdapter::new(Platform::GoogleAds).failing();
        let started = Instant::now();

        let result = executor(4, 250, 1000)
            .execute(&CancellationToken::new(), &adapter, &request(Platform::GoogleAds))
            .await;

        assert!(!result.is_success());
        assert_eq!(adapter.deploy_calls(), 4);
        assert_eq!(result.attempts(), 4);
        assert!(started.elapsed() >= Duration::from_millis(3 * 250));
        let error = result.error.unwrap();
        assert!(error.contains("after 4 attempt(s)"));
        assert!(error.contains("mock google_ads deployment failure"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_adapter_times_out_every_attempt() {
        let adapter =
            MockPlatformAdapter::new(Platform::Meta).with_latency(Duration::from_secs(2));

        let result = executor(2, 100, 500)
            .execute(&CancellationToken::new(), &adapter, &request(Platform::Meta))
            .await;

        assert!(!result.is_success());
        assert_eq!(adapter.deploy_calls(), 2);
        assert!(adapter.deployments().is_empty());
        assert!(result.error.unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_skips_remaining_backoff() {
        let adapter = MockPlatformAdapter::new(Platform::Meta).failing();
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let result = executor(5, 10_000, 1000)
            .execute(&cancel, &adapter, &request(Platform::Meta))
            .await;

        assert!(!result.is_success());
        assert_eq!(adapter.deploy_calls(), 1);
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(result.error.unwrap().contains("cancelled after 1 attempt(s)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_lets_in_flight_attempt_finish() {
        let adapter =
            MockPlatformAdapter::new(Platform::Meta).with_latency(Duration::from_millis(300));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let result = executor(3, 100, 1000)
            .execute(&cancel, &adapter, &request(Platform::Meta))
            .await;

        assert!(result.is_success());
        assert_eq!(adapter.deploy_calls(), 1);
    }
}
