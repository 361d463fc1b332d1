//! WebSocket feed: the live gateway connection.
//!
//! Connects to the gateway, forwards every text frame as an envelope, and
//! reconnects with exponential backoff whenever the connection closes or
//! fails. The backoff resets after each successful connection.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::{forward, FeedSource, Forwarded};
use crate::config::ReconnectConfig;
use crate::types::{Envelope, MonitorError};

// ---------------------------------------------------------------------------
// Backoff
// ---------------------------------------------------------------------------

/// Exponential reconnect delay with a cap.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectConfig,
    current_ms: u64,
    failures: u32,
}

impl Backoff {
    pub fn new(config: ReconnectConfig) -> Self {
        let current_ms = config.initial_delay_ms;
        Self {
            config,
            current_ms,
            failures: 0,
        }
    }

    /// Delay before the next attempt; grows the following one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = Duration::from_millis(self.current_ms);
        let next = (self.current_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_ms = next.min(self.config.max_delay_ms);
        delay
    }

    /// Count a failed attempt. Returns false once the attempt budget is spent.
    pub fn record_failure(&mut self) -> bool {
        self.failures += 1;
        self.config.max_attempts == 0 || self.failures < self.config.max_attempts
    }

    /// Forget past failures after a successful connection.
    pub fn reset(&mut self) {
        self.current_ms = self.config.initial_delay_ms;
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// How a single connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Server closed or the stream ended; reconnect.
    Closed,
    /// The dispatcher is gone; stop for good.
    ReceiverGone,
}

pub struct WebSocketFeed {
    url: String,
    reconnect: ReconnectConfig,
}

impl WebSocketFeed {
    pub fn new(url: impl Into<String>, reconnect: ReconnectConfig) -> Self {
        Self {
            url: url.into(),
            reconnect,
        }
    }

    /// Connect once and forward frames until the connection ends.
    async fn session(&self, tx: &mpsc::Sender<Envelope>) -> Result<SessionEnd, MonitorError> {
        info!(url = %self.url, "Connecting to feed");
        let (mut ws, response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| MonitorError::Transport(e.to_string()))?;
        info!(status = %response.status(), "Feed connected");

        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if forward(&text, tx).await == Forwarded::ReceiverGone {
                        return Ok(SessionEnd::ReceiverGone);
                    }
                }
                Ok(Message::Ping(data)) => {
                    debug!("Received ping");
                    ws.send(Message::Pong(data))
                        .await
                        .map_err(|e| MonitorError::Transport(e.to_string()))?;
                }
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "Feed closed by server");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Feed error");
                    break;
                }
            }
        }

        Ok(SessionEnd::Closed)
    }
}

#[async_trait]
impl FeedSource for WebSocketFeed {
    async fn run(&self, tx: mpsc::Sender<Envelope>) -> Result<(), MonitorError> {
        let mut backoff = Backoff::new(self.reconnect.clone());

        loop {
            match self.session(&tx).await {
                Ok(SessionEnd::ReceiverGone) => {
                    info!("Dispatcher gone, stopping feed");
                    return Ok(());
                }
                Ok(SessionEnd::Closed) => backoff.reset(),
                Err(e) => {
                    if !backoff.record_failure() {
                        error!(error = %e, failures = backoff.failures(), "Giving up on feed");
                        return Err(e);
                    }
                    warn!(error = %e, failures = backoff.failures(), "Feed connection failed");
                }
            }

            if tx.is_closed() {
                return Ok(());
            }
            let delay = backoff.next_delay();
            info!(delay_ms = delay.as_millis() as u64, "Reconnecting to feed");
            tokio::time::sleep(delay).await;
        }
    }

    fn name(&self) -> &str {
        "websocket"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
