use thiserror::Error;

use crate::common::PublishError;

/// Systemic failures of approval handling.
///
/// Platform failures never show up here; they are reported through the
/// published events. An error from `handle_approval` means the results could
/// not be reported at all and the caller decides about redelivery.
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("event bus rejected publish: {0}")]
    Publish(#[from] PublishError),
}
