//! Feed transport.
//!
//! Defines the `FeedSource` trait and provides implementations for:
//! - WebSocket: the live gateway feed, with reconnect and backoff
//! - Replay: a JSON-lines file of recorded envelopes
//!
//! Sources decode text frames into envelopes and push them into a bounded
//! channel. `dispatch` drains that channel as the single writer of the
//! shared state, so envelopes from any source apply one at a time, in
//! arrival order.

pub mod replay;
pub mod websocket;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::{AppState, DispatchStats};
use crate::types::{Envelope, MonitorError};

pub use replay::ReplayFeed;
pub use websocket::WebSocketFeed;

/// Abstraction over envelope producers.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Produce envelopes into `tx` until the source is exhausted, the
    /// receiver is dropped, or the source gives up.
    async fn run(&self, tx: mpsc::Sender<Envelope>) -> Result<(), MonitorError>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Parse one JSON text frame into an envelope.
pub fn decode_envelope(text: &str) -> Result<Envelope, MonitorError> {
    serde_json::from_str(text).map_err(|e| MonitorError::MalformedEnvelope(e.to_string()))
}

/// Bare text frame the gateway sends to keep idle connections open.
pub const KEEP_ALIVE_FRAME: &str = "ping";

/// Whether the dispatcher is still accepting envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Forwarded {
    Sent,
    KeepAlive,
    Dropped,
    ReceiverGone,
}

/// Decode `text` and send it on. Malformed frames are logged and dropped.
pub(crate) async fn forward(text: &str, tx: &mpsc::Sender<Envelope>) -> Forwarded {
    if text.trim() == KEEP_ALIVE_FRAME {
        debug!("Keep-alive received");
        return Forwarded::KeepAlive;
    }

    match decode_envelope(text) {
        Ok(envelope) => {
            if tx.send(envelope).await.is_err() {
                return Forwarded::ReceiverGone;
            }
            Forwarded::Sent
        }
        Err(e) => {
            warn!(error = %e, raw = %text, "Dropping malformed envelope");
            Forwarded::Dropped
        }
    }
}

/// Apply every envelope from `rx` to `state` until all senders are gone.
///
/// Rejected envelopes (unknown type, invalid contents) are logged and
/// skipped; nothing here stops the stream.
pub async fn dispatch(mut rx: mpsc::Receiver<Envelope>, state: AppState) -> DispatchStats {
    while let Some(envelope) = rx.recv().await {
        match state.apply(&envelope).await {
            Ok(outcome) => {
                debug!(message_type = %envelope.message_type, outcome = ?outcome, "Envelope applied");
            }
            Err(e) => {
                warn!(error = %e, message_type = %envelope.message_type, "Envelope rejected");
            }
        }
    }

    let stats = state.stats().await;
    info!(routed = stats.routed, rejected = stats.rejected, "Feed closed, dispatcher stopping");
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
