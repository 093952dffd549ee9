//! Telegram control panel for the pattern rotation.
//!
//! State-free request/response menu: every message and callback maps 1:1 to
//! a Pattern Store operation or an allow-list read. Senders not on the
//! operator allow-list are ignored (messages) or answered with a generic
//! denial (callbacks, which must always be acknowledged).

use std::sync::Arc;

use chrono::Local;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};

use crate::core::config::TelegramConfig;
use crate::sms::PatternStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fixed reply-text labels the panel understands.
const BTN_CURRENT: &str = "📱 پترن امروز";
const BTN_NEXT: &str = "➡️ برو به پترن بعدی";
const BTN_LIST: &str = "📋 لیست پترن‌ها";
const BTN_ADMINS: &str = "👥 لیست ادمین‌ها";

/// Dependencies shared by the panel handlers.
#[derive(Clone)]
pub struct PanelDeps {
    pub config: Arc<TelegramConfig>,
    pub patterns: Arc<PatternStore>,
}

/// Inline keyboard callback button helper.
fn cb(text: &str, data: &str) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.to_string(), data.to_string())
}

/// Creates the dispatcher schema for the control panel.
///
/// The same schema is used in production and in tests.
pub fn schema(deps: PanelDeps) -> UpdateHandler<HandlerError> {
    let deps_messages = deps.clone();
    let deps_callbacks = deps;

    dptree::entry()
        .branch(Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
            let deps = deps_messages.clone();
            async move {
                handle_panel_message(&bot, &msg, &deps).await;
                Ok(())
            }
        }))
        .branch(Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
            let deps = deps_callbacks.clone();
            async move {
                handle_panel_callback(&bot, q, &deps).await;
                Ok(())
            }
        }))
}

/// Runs the panel dispatcher until shutdown.
pub async fn run_panel(bot: Bot, deps: PanelDeps) {
    log::info!("Starting Telegram control panel ({} operators)", deps.config.admins.len());

    Dispatcher::builder(bot, schema(deps))
        .default_handler(|_| async {})
        .build()
        .dispatch()
        .await;
}

async fn handle_panel_message(bot: &Bot, msg: &Message, deps: &PanelDeps) {
    let Some(from) = msg.from.as_ref() else {
        return;
    };

    if !deps.config.is_operator(from.id.0) {
        log::info!(
            "🚫 Unauthorized panel access attempt (user_id={}, username={:?})",
            from.id.0,
            from.username
        );
        return;
    }

    log::info!(
        "✅ Operator access granted (user_id={}, message={:?})",
        from.id.0,
        msg.text()
    );

    let result = match msg.text() {
        Some(BTN_CURRENT) => send_current_pattern(bot, msg.chat.id, &deps.patterns).await,
        Some(BTN_NEXT) => send_next_pattern(bot, msg.chat.id, &deps.patterns).await,
        Some(BTN_LIST) => send_patterns_list(bot, msg.chat.id, &deps.patterns).await,
        Some(BTN_ADMINS) => send_admins_list(bot, msg.chat.id, &deps.config).await,
        // /start and anything else both land on the main menu.
        _ => send_main_menu(bot, msg.chat.id).await,
    };

    if let Err(e) = result {
        log::error!("Panel message handler failed (chat_id={}): {}", msg.chat.id, e);
    }
}

async fn handle_panel_callback(bot: &Bot, q: CallbackQuery, deps: &PanelDeps) {
    let callback_id = q.id.clone();

    if !deps.config.is_operator(q.from.id.0) {
        log::info!(
            "🚫 Unauthorized panel callback attempt (user_id={}, username={:?})",
            q.from.id.0,
            q.from.username
        );
        let _ = bot
            .answer_callback_query(callback_id)
            .text("❌ دسترسی غیرمجاز")
            .await;
        return;
    }

    log::info!(
        "✅ Operator callback access granted (user_id={}, data={:?})",
        q.from.id.0,
        q.data
    );

    if let (Some(data), Some(chat_id)) = (q.data.as_deref(), q.message.as_ref().map(|m| m.chat().id)) {
        let result = match data {
            "current_pattern" => send_current_pattern(bot, chat_id, &deps.patterns).await,
            "next_pattern" => send_next_pattern(bot, chat_id, &deps.patterns).await,
            "list_patterns" => send_patterns_list(bot, chat_id, &deps.patterns).await,
            "list_admins" => send_admins_list(bot, chat_id, &deps.config).await,
            other => {
                log::warn!("Unknown panel callback: {}", other);
                Ok(())
            }
        };

        if let Err(e) = result {
            log::error!("Panel callback handler failed (chat_id={}): {}", chat_id, e);
        }
    }

    // Callbacks must always be acknowledged or the client keeps spinning.
    let _ = bot.answer_callback_query(callback_id).await;
}

async fn send_main_menu(bot: &Bot, chat_id: ChatId) -> Result<(), teloxide::RequestError> {
    let text = "🤖 ربات مدیریت پترن‌های SMS\n\
                👋 سلام ! خوش آمدید\n\
                🔒 دسترسی امنیتی فعال\n\n\
                لطفاً یکی از گزینه‌های زیر را انتخاب کنید:";

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![cb(BTN_CURRENT, "current_pattern")],
        vec![cb(BTN_NEXT, "next_pattern")],
        vec![cb(BTN_LIST, "list_patterns")],
        vec![cb(BTN_ADMINS, "list_admins")],
    ]);

    bot.send_message(chat_id, text).reply_markup(keyboard).await?;
    Ok(())
}

async fn send_current_pattern(
    bot: &Bot,
    chat_id: ChatId,
    patterns: &PatternStore,
) -> Result<(), teloxide::RequestError> {
    let info = patterns.current();

    let text = format!(
        "📱 پترن فعلی:\n\n\
         🔹 گروه: {}\n\
         🔹 شماره: {} از {}\n\
         🔹 کد پترن: `{}`\n\n\
         ⏰ زمان: {}",
        info.group,
        info.index,
        patterns.len(),
        info.code,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    bot.send_message(chat_id, text).parse_mode(ParseMode::Markdown).await?;
    Ok(())
}

async fn send_next_pattern(bot: &Bot, chat_id: ChatId, patterns: &PatternStore) -> Result<(), teloxide::RequestError> {
    let info = patterns.advance();

    let text = format!(
        "✅ پترن تغییر کرد!\n\n\
         🔹 گروه جدید: {}\n\
         🔹 شماره: {} از {}\n\
         🔹 کد پترن: `{}`\n\n\
         ⏰ زمان تغییر: {}",
        info.group,
        info.index,
        patterns.len(),
        info.code,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    bot.send_message(chat_id, text).parse_mode(ParseMode::Markdown).await?;
    Ok(())
}

async fn send_patterns_list(
    bot: &Bot,
    chat_id: ChatId,
    patterns: &PatternStore,
) -> Result<(), teloxide::RequestError> {
    let mut text = "📋 لیست تمام پترن‌ها:\n\n".to_string();

    for entry in patterns.list() {
        let status = if entry.is_current { "✅ فعلی" } else { "❌" };
        text.push_str(&format!("{} {} ({}): `{}`\n", status, entry.label, entry.index, entry.code));
    }

    if patterns.is_empty() {
        text.push_str("پترنی تنظیم نشده است.\n");
    }

    text.push_str(&format!("\n⏰ زمان: {}", Local::now().format("%Y-%m-%d %H:%M:%S")));

    bot.send_message(chat_id, text).parse_mode(ParseMode::Markdown).await?;
    Ok(())
}

async fn send_admins_list(bot: &Bot, chat_id: ChatId, config: &TelegramConfig) -> Result<(), teloxide::RequestError> {
    let mut text = "👥 لیست ادمین‌ها:\n\n".to_string();
    for (i, admin) in config.admins.iter().enumerate() {
        text.push_str(&format!("{}. `{}`\n", i + 1, admin));
    }

    bot.send_message(chat_id, text).parse_mode(ParseMode::Markdown).await?;
    Ok(())
}
