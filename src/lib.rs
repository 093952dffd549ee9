//! Leadrelay - NovinHub webhook receiver with IPPanel pattern-SMS dispatch
//!
//! Receives social-CRM webhook events, detects Iranian phone numbers in
//! lead events, and sends a rotating pattern SMS through IPPanel with a
//! once-per-day dedup guard. A Telegram control panel manages the rotation.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, phone parsing
//! - `sms`: pattern store, dedup cache, gateway client, dispatch service
//! - `server`: webhook ingress and health endpoint
//! - `telegram`: operator control panel

pub mod cli;
pub mod core;
pub mod server;
pub mod sms;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, Config};
pub use server::{router, start_server, AppState};
pub use sms::{DedupCache, IppanelClient, PatternStore, SmsDispatcher};
