//! ARBMONITOR: live odds, arbitrage and profit views
//!
//! Entry point. Loads configuration, initialises structured logging,
//! starts the dashboard and the feed, and applies envelopes until the
//! feed ends or Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

use arbmonitor::config;
use arbmonitor::dashboard::{self, DashboardState};
use arbmonitor::feed::{self, FeedSource, ReplayFeed, WebSocketFeed};
use arbmonitor::state::SharedState;
use arbmonitor::store::MarketState;

/// Environment variable overriding the config file path.
const CONFIG_PATH_ENV: &str = "ARBMONITOR_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    // wss:// feeds need a process-wide crypto provider; ignore if one is set.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".into());
    let cfg = config::AppConfig::load_or_default(&config_path)?;

    info!(
        config = %config_path,
        arb_window_secs = cfg.windows.arb_window_secs,
        profit_window_secs = cfg.windows.profit_window_secs,
        "ARBMONITOR starting up"
    );

    // -- Shared state ----------------------------------------------------

    let shared = Arc::new(SharedState::new(MarketState::with_windows(
        cfg.windows.arb_window_ms(),
        cfg.windows.profit_window_ms(),
    )));

    if cfg.dashboard.enabled {
        dashboard::spawn_dashboard(
            DashboardState::new(shared.clone(), cfg.dashboard.max_arbitrages),
            cfg.dashboard.port,
        );
    }

    // -- Feed ------------------------------------------------------------

    let source: Box<dyn FeedSource> = match &cfg.feed.replay_path {
        Some(path) => Box::new(
            ReplayFeed::new(path.clone())
                .with_delay(Duration::from_millis(cfg.feed.replay_delay_ms)),
        ),
        None => Box::new(WebSocketFeed::new(cfg.feed.url.clone(), cfg.feed.reconnect.clone())),
    };
    info!(source = source.name(), "Starting feed");

    let (tx, rx) = mpsc::channel(cfg.feed.channel_capacity);
    let feed_task = tokio::spawn(async move {
        if let Err(e) = source.run(tx).await {
            error!(error = %e, "Feed stopped");
        }
    });
    let dispatcher = tokio::spawn(feed::dispatch(rx, shared.clone()));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tokio::select! {
        result = dispatcher => {
            if let Err(e) = result {
                error!(error = %e, "Dispatcher task failed");
            }
        }
        _ = &mut shutdown => {
            info!("Shutdown signal received.");
            feed_task.abort();
        }
    }

    let market = shared.read().await;
    let stats = shared.stats().await;
    info!(
        quotes = market.odds.len(),
        live_arbitrages = market.arbitrages.len(),
        total_profit = format!("${:.2}", market.get_total_profit()),
        routed = stats.routed,
        rejected = stats.rejected,
        "ARBMONITOR shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("arbmonitor=info"));

    let json_logging = std::env::var("ARBMONITOR_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
