// Inbound edges of the deployment domain
pub mod consumer;

pub use consumer::ApprovalConsumer;
