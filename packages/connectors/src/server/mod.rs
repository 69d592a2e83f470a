// HTTP server setup (Axum health and metrics surface)
pub mod app;
pub mod routes;

pub use app::*;
