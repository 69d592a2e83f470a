//! Outbound event bus: the live NATS client and a recording stand-in.

use anyhow::{anyhow, bail, Context, Result};
use async_nats::connection::State;
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// One recorded publish.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
}

/// Trait for the outbound side of the event bus.
///
/// Implementations must be safe to share across concurrent deployments.
#[async_trait]
pub trait NatsPublisher: Send + Sync {
    /// Publish a message to a subject.
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()>;

    /// Report whether the bus can currently accept publishes.
    async fn health_check(&self) -> Result<()>;
}

/// Publisher backed by a live `async_nats` connection.
pub struct NatsClientPublisher {
    client: async_nats::Client,
}

impl NatsClientPublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NatsPublisher for NatsClientPublisher {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.client
            .publish(subject.clone(), payload)
            .await
            .with_context(|| format!("NATS publish to {} failed", subject))
    }

    async fn health_check(&self) -> Result<()> {
        match self.client.connection_state() {
            State::Connected => Ok(()),
            other => Err(anyhow!("NATS is not connected (state: {:?})", other)),
        }
    }
}

/// In-memory bus that records every publish, for tests.
///
/// Publishes and health checks can be switched to fail so tests can
/// exercise the bus-down paths.
#[derive(Default)]
pub struct TestNats {
    log: Mutex<Vec<PublishedMessage>>,
    fail_publishes: AtomicBool,
    fail_health: AtomicBool,
}

impl TestNats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following publish fail (or succeed again).
    pub fn fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::SeqCst);
    }

    /// Make every following health check fail (or succeed again).
    pub fn fail_health(&self, fail: bool) {
        self.fail_health.store(fail, Ordering::SeqCst);
    }

    fn log(&self) -> MutexGuard<'_, Vec<PublishedMessage>> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Everything published so far, oldest first.
    pub fn published_messages(&self) -> Vec<PublishedMessage> {
        self.log().clone()
    }

    pub fn messages_for_subject(&self, subject: &str) -> Vec<PublishedMessage> {
        self.log()
            .iter()
            .filter(|m| m.subject == subject)
            .cloned()
            .collect()
    }

    /// JSON payloads published on `subject`, decoded in publish order.
    pub fn decoded<T: DeserializeOwned>(&self, subject: &str) -> serde_json::Result<Vec<T>> {
        self.messages_for_subject(subject)
            .iter()
            .map(|m| serde_json::from_slice(&m.payload))
            .collect()
    }

    pub fn was_published_to(&self, subject: &str) -> bool {
        self.publish_count_for(subject) > 0
    }

    pub fn publish_count(&self) -> usize {
        self.log().len()
    }

    pub fn publish_count_for(&self, subject: &str) -> usize {
        self.log().iter().filter(|m| m.subject == subject).count()
    }

    pub fn clear(&self) {
        self.log().clear();
    }
}

#[async_trait]
impl NatsPublisher for TestNats {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        if self.fail_publishes.load(Ordering::SeqCst) {
            bail!("NATS is not connected");
        }
        self.log().push(PublishedMessage { subject, payload });
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        if self.fail_health.load(Ordering::SeqCst) {
            bail!("NATS is not connected");
        }
        Ok(())
    }
}
