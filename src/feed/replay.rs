//! Replay feed: envelopes from a JSON-lines file.
//!
//! One envelope per line; blank lines are skipped and malformed lines are
//! logged and skipped. Useful for demos and for reproducing a session.

use async_trait::async_trait;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use super::{forward, FeedSource, Forwarded};
use crate::types::{Envelope, MonitorError};

pub struct ReplayFeed {
    path: String,
    /// Pause between lines. Zero replays as fast as the channel allows.
    delay: Duration,
}

impl ReplayFeed {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl FeedSource for ReplayFeed {
    async fn run(&self, tx: mpsc::Sender<Envelope>) -> Result<(), MonitorError> {
        let file = File::open(&self.path)
            .await
            .map_err(|e| MonitorError::Transport(format!("failed to open {}: {e}", self.path)))?;
        let mut lines = BufReader::new(file).lines();

        info!(path = %self.path, "Replaying feed");
        let (mut sent, mut dropped) = (0u64, 0u64);

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| MonitorError::Transport(format!("failed to read {}: {e}", self.path)))?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match forward(line, &tx).await {
                Forwarded::Sent => sent += 1,
                Forwarded::KeepAlive => {}
                Forwarded::Dropped => dropped += 1,
                Forwarded::ReceiverGone => break,
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(path = %self.path, sent, dropped, "Replay finished");
        Ok(())
    }

    fn name(&self) -> &str {
        "replay"
    }
}
