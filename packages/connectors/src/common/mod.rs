// Common types and utilities shared across the application

pub mod nats;

pub use nats::{publish_event, subject_for, IntoNatsPayload, PublishError};
