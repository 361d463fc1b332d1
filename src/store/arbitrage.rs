//! Arbitrage store: live opportunities keyed by id.
//!
//! Eviction is write-triggered: every upsert drops records older than the
//! window relative to the wall clock at the time of the call. Between
//! writes a record can be stale but still present.

use chrono::Utc;
use std::collections::HashMap;
use tracing::debug;

use super::ARB_WINDOW_MS;
use crate::types::ArbitrageRecord;

#[derive(Debug, Clone)]
pub struct ArbitrageStore {
    arbitrages: HashMap<String, ArbitrageRecord>,
    window_ms: i64,
}

impl Default for ArbitrageStore {
    fn default() -> Self {
        Self::with_window(ARB_WINDOW_MS)
    }
}

impl ArbitrageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window_ms: i64) -> Self {
        Self {
            arbitrages: HashMap::new(),
            window_ms,
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Insert or overwrite by id, then evict expired records using the
    /// current wall-clock time. Returns the number of records evicted.
    pub fn upsert(&mut self, arb: ArbitrageRecord) -> usize {
        self.upsert_at(arb, Utc::now().timestamp_millis())
    }

    /// `upsert` with an explicit "now" in epoch milliseconds.
    ///
    /// The inserted record is subject to the same eviction as every other,
    /// so a record already older than the window is dropped immediately.
    pub fn upsert_at(&mut self, arb: ArbitrageRecord, now_ms: i64) -> usize {
        debug!(arb_id = %arb.id, status = %arb.status, "Arbitrage stored");
        self.arbitrages.insert(arb.id.clone(), arb);

        let window_ms = self.window_ms;
        let before = self.arbitrages.len();
        self.arbitrages
            .retain(|_, a| now_ms.saturating_sub(a.timestamp) <= window_ms);
        let evicted = before - self.arbitrages.len();

        if evicted > 0 {
            debug!(evicted, live = self.arbitrages.len(), "Expired arbitrages evicted");
        }
        evicted
    }

    /// All live records, in no particular order.
    pub fn list(&self) -> Vec<&ArbitrageRecord> {
        self.arbitrages.values().collect()
    }

    pub fn get(&self, id: &str) -> Option<&ArbitrageRecord> {
        self.arbitrages.get(id)
    }

    pub fn len(&self) -> usize {
        self.arbitrages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arbitrages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
