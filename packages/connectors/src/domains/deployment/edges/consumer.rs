//! NATS intake for approval events.
//!
//! Subscribes to the inbound status subject in a queue group, so several
//! connector replicas share the load, and hands every approved asset to the
//! orchestrator on its own task. At most `max_in_flight` approvals run at
//! once; the subscription is not read while all permits are taken.

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::config::NatsConfig;
use crate::domains::deployment::activities::DeploymentOrchestrator;
use crate::domains::deployment::events::AssetStatusChangedEvent;

pub struct ApprovalConsumer {
    orchestrator: DeploymentOrchestrator,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl ApprovalConsumer {
    pub fn new(orchestrator: DeploymentOrchestrator, max_in_flight: usize) -> Self {
        Self {
            orchestrator,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            tracker: TaskTracker::new(),
        }
    }

    /// Subscribe and consume until `cancel` fires, then wait for in-flight
    /// approvals to finish.
    pub async fn run(
        &self,
        client: async_nats::Client,
        nats: &NatsConfig,
        cancel: CancellationToken,
    ) -> Result<()> {
        let subscriber = client
            .queue_subscribe(nats.inbound_subject.clone(), nats.queue_group.clone())
            .await
            .with_context(|| format!("failed to subscribe to {}", nats.inbound_subject))?;

        info!(
            subject = %nats.inbound_subject,
            queue_group = %nats.queue_group,
            max_in_flight = self.permits.available_permits(),
            "approval consumer subscribed"
        );

        self.consume(subscriber.map(|message| message.payload), &cancel)
            .await
    }

    /// Drive a stream of raw payloads. Returns once the stream ends or
    /// `cancel` fires and every spawned approval has completed.
    pub async fn consume<S>(&self, messages: S, cancel: &CancellationToken) -> Result<()>
    where
        S: Stream<Item = Bytes>,
    {
        let mut messages = std::pin::pin!(messages);

        loop {
            let payload = tokio::select! {
                _ = cancel.cancelled() => break,
                next = messages.next() => match next {
                    Some(payload) => payload,
                    None => break,
                },
            };

            let Some(event) = accept(&payload) else {
                continue;
            };

            let permit = tokio::select! {
                _ = cancel.cancelled() => {
                    warn!(
                        asset_id = %event.asset_id,
                        "shutting down before approval could start, approval not processed"
                    );
                    break;
                }
                permit = self.permits.clone().acquire_owned() => {
                    permit.context("approval permits closed")?
                }
            };

            let orchestrator = self.orchestrator.clone();
            let cancel = cancel.clone();
            self.tracker.spawn(async move {
                let _permit = permit;
                if let Err(e) = orchestrator.handle_approval(&cancel, &event).await {
                    error!(asset_id = %event.asset_id, error = %e, "approval handling failed");
                }
            });
        }

        self.tracker.close();
        info!(in_flight = self.tracker.len(), "approval consumer draining");
        self.tracker.wait().await;
        info!("approval consumer stopped");
        Ok(())
    }
}

/// Decode a payload and keep it only if it is an approval.
fn accept(payload: &[u8]) -> Option<AssetStatusChangedEvent> {
    let event: AssetStatusChangedEvent = match serde_json::from_slice(payload) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, bytes = payload.len(), "dropping malformed status event");
            return None;
        }
    };

    if !event.is_approval() {
        debug!(asset_id = %event.asset_id, status = %event.status, "skipping non-approval");
        return None;
    }
    Some(event)
}
