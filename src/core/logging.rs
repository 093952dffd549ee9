//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - SMS gateway configuration validation and logging at startup

use simplelog::*;
use std::fs::File;

use crate::core::config::Config as AppConfig;
use crate::core::error::{AppError, AppResult};

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `level` - Log level name (error, warn, info, debug, trace)
/// * `log_file_path` - Path to the log file
pub fn init_logger(level: &str, log_file_path: &str) -> AppResult<()> {
    let filter = parse_level(level);
    let log_file = File::create(log_file_path)?;

    CombinedLogger::init(vec![
        TermLogger::new(filter, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(filter, Config::default(), log_file),
    ])
    .map_err(|e| AppError::Validation(format!("failed to initialize logger: {}", e)))?;

    Ok(())
}

fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Logs SMS gateway configuration at application startup
///
/// Validates and logs:
/// - SMS enable flag and IPPanel credentials presence
/// - Configured pattern codes and originator
/// - Telegram operator allow-list size
pub fn log_sms_configuration(cfg: &AppConfig) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("📡 SMS Gateway Configuration Check");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if cfg.sms.enabled {
        log::info!("✅ SMS sending: enabled");
    } else {
        log::warn!("⚠️  SMS sending: DISABLED - leads will be logged but no SMS goes out");
    }

    if cfg.sms.ippanel.api_key.is_empty() {
        log::error!("❌ IPPanel API key not configured - SMS dispatch will be skipped");
    } else {
        log::info!("✅ IPPanel API key configured");
    }

    if cfg.sms.ippanel.originator.is_empty() {
        log::error!("❌ IPPanel originator (sender line) not configured");
    } else {
        log::info!("✅ Originator: {}", cfg.sms.ippanel.originator);
    }

    if cfg.sms.ippanel.patterns.is_empty() {
        log::error!("❌ No pattern codes configured - dispatch will fail with NotConfigured");
    } else {
        log::info!("✅ Pattern codes: {} configured", cfg.sms.ippanel.patterns.len());
    }

    if cfg.telegram.bot_token.is_empty() {
        log::warn!("⚠️  Telegram bot token not set - control panel disabled");
    } else {
        log::info!("✅ Control panel operators: {}", cfg.telegram.admins.len());
    }

    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
