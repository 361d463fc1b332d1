//! Configuration loading from TOML with environment overrides.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section is optional and falls back to its defaults. The feed URL
//! can be overridden with `ARBMONITOR_FEED_URL`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::engine::view::DEFAULT_MAX_ARBITRAGES;
use crate::types::MonitorError;

/// Environment variable overriding `feed.url`.
pub const FEED_URL_ENV: &str = "ARBMONITOR_FEED_URL";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub windows: WindowsConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    /// WebSocket endpoint publishing the envelopes.
    pub url: String,
    /// JSON-lines file to replay instead of connecting.
    pub replay_path: Option<String>,
    /// Pause between replayed lines, in milliseconds. 0 replays at full speed.
    pub replay_delay_ms: u64,
    /// Capacity of the queue between the feed and the dispatcher.
    pub channel_capacity: usize,
    pub reconnect: ReconnectConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8000/ws".to_string(),
            replay_path: None,
            replay_delay_ms: 0,
            channel_capacity: 1024,
            reconnect: ReconnectConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReconnectConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    /// Consecutive failed attempts before giving up. 0 retries forever.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
            max_attempts: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WindowsConfig {
    pub arb_window_secs: u64,
    pub profit_window_secs: u64,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            arb_window_secs: 300,
            profit_window_secs: 300,
        }
    }
}

impl WindowsConfig {
    pub fn arb_window_ms(&self) -> i64 {
        secs_to_ms(self.arb_window_secs)
    }

    pub fn profit_window_ms(&self) -> i64 {
        secs_to_ms(self.profit_window_secs)
    }
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs.saturating_mul(1_000)).unwrap_or(i64::MAX)
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
    /// How many arbitrages the query surface returns.
    pub max_arbitrages: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3001,
            max_arbitrages: DEFAULT_MAX_ARBITRAGES,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults. Environment
    /// overrides are applied in both cases.
    pub fn load_or_default(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::load(path)?
        } else {
            info!(path, "No config file found, using defaults");
            Self::default()
        };
        if let Ok(url) = std::env::var(FEED_URL_ENV) {
            config.feed.url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.feed.replay_path.is_none() && self.feed.url.is_empty() {
            return Err(MonitorError::Config("feed.url is empty".into()));
        }
        if self.feed.channel_capacity == 0 {
            return Err(MonitorError::Config("feed.channel_capacity must be > 0".into()));
        }
        let reconnect = &self.feed.reconnect;
        if reconnect.backoff_multiplier < 1.0 {
            return Err(MonitorError::Config(
                "feed.reconnect.backoff_multiplier must be >= 1.0".into(),
            ));
        }
        if reconnect.initial_delay_ms > reconnect.max_delay_ms {
            return Err(MonitorError::Config(
                "feed.reconnect.initial_delay_ms exceeds max_delay_ms".into(),
            ));
        }
        if self.windows.arb_window_secs == 0 || self.windows.profit_window_secs == 0 {
            return Err(MonitorError::Config("windows must be non-zero".into()));
        }
        Ok(())
    }
}
