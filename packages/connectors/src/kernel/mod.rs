//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod http_adapter;
pub mod nats;
pub mod test_dependencies;
pub mod traits;

pub use deps::{PlatformRegistry, ServerDeps};
pub use http_adapter::{GatewayOptions, HttpPlatformAdapter};
pub use nats::{NatsClientPublisher, NatsPublisher, PublishedMessage, TestNats};
pub use test_dependencies::{MockPlatformAdapter, TestDependencies};
pub use traits::*;
