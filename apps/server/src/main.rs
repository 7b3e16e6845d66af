//! Lurker - social and market surge alert bot
//!
//! Polls the social platform and token market data, and posts surge
//! alerts to a Telegram chat.

mod config;
mod monitor;
mod state;

use config::{AppConfig, Credentials, HttpSettings};
use monitor::Monitor;
use state::create_state;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use lurker_alerts::{CommandHandler, Notifier, TelegramBot};
use lurker_feeds::{
    ContractValidator, DexScreenerClient, EtherscanClient, FeedError, MarketData, SocialApi,
    SolscanClient, TokenResolver, XClient,
};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Remote clients, built once at startup.
struct Feeds {
    social: Arc<dyn SocialApi>,
    market: Arc<dyn MarketData>,
    resolver: TokenResolver,
}

fn build_feeds(http: &HttpSettings, credentials: &Credentials) -> Result<Feeds, FeedError> {
    let timeout = http.timeout();

    let mut x = XClient::new(credentials.x_bearer_token.as_str(), timeout)?;
    if let Some(url) = &http.x_base_url {
        x = x.with_base_url(url)?;
    }

    let mut etherscan = EtherscanClient::new(credentials.etherscan_api_key.as_str(), timeout)?;
    if let Some(url) = &http.etherscan_base_url {
        etherscan = etherscan.with_base_url(url)?;
    }

    let mut solscan = SolscanClient::new(timeout)?;
    if let Some(url) = &http.solscan_base_url {
        solscan = solscan.with_base_url(url)?;
    }

    let mut dexscreener = DexScreenerClient::new(timeout)?;
    if let Some(url) = &http.dexscreener_base_url {
        dexscreener = dexscreener.with_base_url(url)?;
    }

    let validators: Vec<Arc<dyn ContractValidator>> = vec![Arc::new(etherscan), Arc::new(solscan)];
    Ok(Feeds {
        social: Arc::new(x),
        market: Arc::new(dexscreener),
        resolver: TokenResolver::new(validators),
    })
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_logging();

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("🚀 Lurker starting...");
    info!("  Poll interval: {} s", config.monitor.interval().as_secs());
    info!("  Accounts: {}", config.monitor.accounts.join(", "));
    info!("  Influencer candidates: {}", config.monitor.influencers.len());
    info!("  HTTP timeout: {} s", config.http.timeout().as_secs());

    let feeds = match build_feeds(&config.http, &credentials) {
        Ok(feeds) => feeds,
        Err(e) => {
            error!("Failed to build HTTP clients: {}", e);
            std::process::exit(1);
        }
    };

    let state = create_state(config);
    state.start();

    let bot = Arc::new(TelegramBot::new(
        &credentials.telegram_bot_token,
        credentials.telegram_alert_chat_id,
    ));
    if let Err(e) = bot.register_commands().await {
        warn!("Failed to register bot commands: {}", e);
    }

    let monitor = Monitor::new(
        state.clone(),
        feeds.social.clone(),
        feeds.market.clone(),
        Notifier::new(bot.clone()),
    );
    // Verifies influencers before its first cycle
    let monitor_handle = tokio::spawn(monitor.run());

    let handler = CommandHandler::new(
        state.registry.clone(),
        state.verified.clone(),
        feeds.resolver.clone(),
        feeds.market.clone(),
    );

    info!("Press Ctrl+C to stop...");
    bot.run(handler).await;

    warn!("Shutdown signal received");
    state.stop();

    // The monitor may be sleeping off a rate limit; don't wait for it
    let abort = monitor_handle.abort_handle();
    if tokio::time::timeout(Duration::from_secs(2), monitor_handle).await.is_err() {
        abort.abort();
    }

    info!("👋 Lurker stopped");
}
