use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use leadrelay::cli::{Cli, Commands};
use leadrelay::core::{init_logger, log_sms_configuration, Config};
use leadrelay::server::{start_server, AppState};
use leadrelay::sms::{DedupCache, PatternStore, SmsDispatcher};
use leadrelay::telegram::{create_bot, run_panel, setup_bot_commands, PanelDeps};

/// Main entry point.
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    let cfg = Config::load().context("Failed to load configuration")?;
    init_logger(&cfg.logging.level, &cfg.logging.file_path)?;

    match cli.command {
        Some(Commands::Credit) => run_credit(cfg).await,
        Some(Commands::Run) | None => run_service(cfg).await,
    }
}

/// Query the gateway balance and exit.
async fn run_credit(cfg: Config) -> Result<()> {
    let patterns = Arc::new(PatternStore::new(cfg.sms.ippanel.patterns.clone()));
    let dispatcher = SmsDispatcher::new(cfg.sms, patterns)?;

    let credit = dispatcher.credit().await.context("Failed to fetch IPPanel credit")?;
    println!("💰 IPPanel credit: {}", credit);
    Ok(())
}

/// Run the webhook server and (when a token is configured) the Telegram panel.
async fn run_service(cfg: Config) -> Result<()> {
    log_sms_configuration(&cfg);

    let patterns = Arc::new(PatternStore::new(cfg.sms.ippanel.patterns.clone()));
    let dedup = DedupCache::new();
    let dispatcher = Arc::new(SmsDispatcher::new(cfg.sms.clone(), Arc::clone(&patterns))?);

    let addr: SocketAddr = cfg
        .server_address()
        .parse()
        .with_context(|| format!("Invalid server address {}", cfg.server_address()))?;
    let state = AppState { dispatcher, dedup };

    let server = tokio::spawn(start_server(addr, state));

    if cfg.telegram.bot_token.is_empty() {
        log::warn!("No Telegram bot token configured - running webhook server only");
        server.await??;
        return Ok(());
    }

    let bot = create_bot(&cfg.telegram.bot_token)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let deps = PanelDeps {
        config: Arc::new(cfg.telegram.clone()),
        patterns,
    };

    tokio::select! {
        result = server => {
            result??;
            Ok(())
        }
        _ = run_panel(bot, deps) => {
            log::warn!("Telegram dispatcher stopped");
            Ok(())
        }
    }
}
