//! Webhook HTTP surface: wire models and the axum server.

pub mod models;
pub mod webhook;

pub use webhook::{router, start_server, AppState};
