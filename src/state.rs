//! Process-wide shared state.
//!
//! Wraps the composed `MarketState` for concurrent readers and a single
//! writer. Each envelope is routed under one write-lock acquisition, so
//! readers only ever observe whole updates. A `watch` channel publishes
//! a revision number after every applied change so readers can react.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, RwLock, RwLockReadGuard};

use crate::engine::{MessageRouter, RouteOutcome};
use crate::store::MarketState;
use crate::types::{Envelope, MonitorError};

/// Counters over everything handed to the router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub routed: u64,
    pub rejected: u64,
}

pub struct SharedState {
    market: RwLock<MarketState>,
    stats: RwLock<DispatchStats>,
    revision: watch::Sender<u64>,
}

pub type AppState = Arc<SharedState>;

impl SharedState {
    pub fn new(market: MarketState) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            market: RwLock::new(market),
            stats: RwLock::new(DispatchStats::default()),
            revision,
        }
    }

    /// Route one envelope into the state.
    ///
    /// Counters and revision move under the same market write guard as the
    /// change itself, so a reader holding the read guard sees all three agree.
    pub async fn apply(&self, envelope: &Envelope) -> Result<RouteOutcome, MonitorError> {
        let mut market = self.market.write().await;
        let result = MessageRouter::route(&mut market, envelope);

        let mut stats = self.stats.write().await;
        match result {
            Ok(_) => {
                stats.routed += 1;
                self.revision.send_modify(|r| *r += 1);
            }
            Err(_) => stats.rejected += 1,
        }
        result
    }

    /// Read access to the current state.
    pub async fn read(&self) -> RwLockReadGuard<'_, MarketState> {
        self.market.read().await
    }

    /// Read access together with the counters as of that same state.
    pub async fn read_with_stats(&self) -> (RwLockReadGuard<'_, MarketState>, DispatchStats) {
        let market = self.market.read().await;
        let stats = *self.stats.read().await;
        (market, stats)
    }

    pub async fn stats(&self) -> DispatchStats {
        *self.stats.read().await
    }

    /// Number of changes applied so far.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver notified after every applied change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArbStatus, ArbitrageRecord, MessageType};
    use serde_json::json;

    fn completed_arb() -> Envelope {
        let arb = ArbitrageRecord::sample(
            "arb-1",
            ArbStatus::Completed,
            chrono::Utc::now().timestamp_millis(),
        );
        Envelope::new(MessageType::ArbExecution, &arb).unwrap()
    }

    #[tokio::test]
    async fn test_apply_updates_state_and_revision() {
        let state = SharedState::new(MarketState::new());
        assert_eq!(state.revision(), 0);

        state.apply(&completed_arb()).await.unwrap();

        assert_eq!(state.revision(), 1);
        assert_eq!(state.read().await.get_total_profit(), 20.0);
        assert_eq!(state.stats().await, DispatchStats { routed: 1, rejected: 0 });
    }

    #[tokio::test]
    async fn test_rejected_envelope_keeps_revision() {
        let state = SharedState::new(MarketState::new());
        let env = Envelope {
            message_type: "heartbeat".to_string(),
            contents: json!({}),
        };

        assert!(state.apply(&env).await.is_err());
        assert_eq!(state.revision(), 0);
        assert_eq!(state.stats().await, DispatchStats { routed: 0, rejected: 1 });
    }

    #[tokio::test]
    async fn test_subscriber_sees_change() {
        let state = SharedState::new(MarketState::new());
        let mut rx = state.subscribe();

        state.apply(&completed_arb()).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
    }

    #[tokio::test]
    async fn test_extreme_timestamp_is_routed() {
        let state = SharedState::new(MarketState::new());
        let arb = ArbitrageRecord::sample("arb-1", ArbStatus::Completed, i64::MIN);

        state
            .apply(&Envelope::new(MessageType::ArbExecution, &arb).unwrap())
            .await
            .unwrap();
        state.apply(&completed_arb()).await.unwrap();

        let market = state.read().await;
        assert_eq!(market.get_total_profit(), 40.0);
        assert_eq!(market.get_arbitrages().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stats_consistent_with_revision() {
        let state = Arc::new(SharedState::new(MarketState::new()));
        let writer = {
            let state = state.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    state.apply(&completed_arb()).await.unwrap();
                }
            })
        };

        while !writer.is_finished() {
            let (_market, stats) = state.read_with_stats().await;
            assert_eq!(stats.routed, state.revision());
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();

        let (_market, stats) = state.read_with_stats().await;
        assert_eq!(stats.routed, 200);
        assert_eq!(state.revision(), 200);
    }
}
