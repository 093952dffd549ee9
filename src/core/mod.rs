//! Core utilities: configuration, errors, logging, phone parsing.

pub mod config;
pub mod error;
pub mod logging;
pub mod phone;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_sms_configuration};
