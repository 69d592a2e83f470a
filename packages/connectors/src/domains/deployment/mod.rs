//! Deployment domain - approved assets in, platform deployments out

pub mod activities;
pub mod edges;
pub mod error;
pub mod events;
pub mod models;

pub use activities::{DeploymentOrchestrator, HealthAggregator, RetryExecutor};
pub use error::DeploymentError;
