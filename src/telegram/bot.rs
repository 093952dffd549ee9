//! Bot instance creation and command registration.

use std::time::Duration;

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;

use crate::core::error::AppResult;

/// Request timeout for Telegram API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates a Bot instance with a bounded-timeout HTTP client.
pub fn create_bot(token: &str) -> AppResult<Bot> {
    let client = ClientBuilder::new().timeout(REQUEST_TIMEOUT).build()?;
    Ok(Bot::with_client(token, client))
}

/// Registers the panel's commands in the Telegram UI.
pub async fn setup_bot_commands(bot: &Bot) -> AppResult<()> {
    bot.set_my_commands(vec![BotCommand::new("start", "نمایش منوی اصلی")])
        .await?;
    Ok(())
}
