//! Telegram control panel integration.

pub mod bot;
pub mod panel;

pub use bot::{create_bot, setup_bot_commands};
pub use panel::{run_panel, schema, HandlerError, PanelDeps};
