//! Common NATS publishing utilities.
//!
//! Outbound events implement [`IntoNatsPayload`] to declare the subject they
//! belong on, and [`publish_event`] turns them into bytes on the bus.
//!
//! # Subject Format
//!
//! `{prefix}.{suffix}` when a prefix is configured, otherwise just `{suffix}`.
//! For example: `zamc.asset.status_changed`.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::kernel::nats::NatsPublisher;

/// Trait for events that can be published to NATS.
pub trait IntoNatsPayload: Serialize + Send + Sync {
    /// Subject suffix, e.g. `asset.status_changed`.
    fn subject_suffix(&self) -> &'static str;
}

/// Failure to put an event on the bus.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to encode event for {subject}: {source}")]
    Encode {
        subject: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to publish to {subject}: {source}")]
    Transport {
        subject: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PublishError {
    pub fn subject(&self) -> &str {
        match self {
            PublishError::Encode { subject, .. } | PublishError::Transport { subject, .. } => {
                subject
            }
        }
    }
}

/// Build a full subject from an optional prefix and a suffix.
pub fn subject_for(prefix: &str, suffix: &str) -> String {
    let prefix = prefix.trim_end_matches('.');
    if prefix.is_empty() {
        suffix.to_string()
    } else {
        format!("{}.{}", prefix, suffix)
    }
}

/// Serialize an event and publish it under `prefix`.
///
/// Returns the subject the event went to.
pub async fn publish_event<E: IntoNatsPayload>(
    event: &E,
    nats: &dyn NatsPublisher,
    prefix: &str,
) -> Result<String, PublishError> {
    let subject = subject_for(prefix, event.subject_suffix());

    let payload = serde_json::to_vec(event).map_err(|source| PublishError::Encode {
        subject: subject.clone(),
        source,
    })?;

    nats.publish(subject.clone(), Bytes::from(payload))
        .await
        .map_err(|source| PublishError::Transport {
            subject: subject.clone(),
            source,
        })?;

    debug!(subject = %subject, "published NATS event");
    Ok(subject)
}
