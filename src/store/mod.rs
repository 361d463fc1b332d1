//! Derived views over the event feed.
//!
//! Three independent stores, each mutated only through its own methods:
//! - `OddsStore`: latest quote per (match, bookmaker)
//! - `ArbitrageStore`: live arbitrages within the retention window
//! - `ProfitAccumulator`: running profit and its windowed display series
//!
//! `MarketState` composes them into the single state object owned by the
//! process. The stores never reference each other; cross-store wiring
//! lives in the router.

pub mod arbitrage;
pub mod odds;
pub mod profit;

use serde::Serialize;

pub use arbitrage::ArbitrageStore;
pub use odds::OddsStore;
pub use profit::ProfitAccumulator;

use crate::types::{ArbitrageRecord, ProfitPoint, QuoteRecord};

/// Retention horizon for arbitrage records (5 minutes, in ms).
pub const ARB_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Retention horizon for the profit display series (5 minutes, in ms).
pub const PROFIT_WINDOW_MS: i64 = 5 * 60 * 1000;

/// The composed state of all three views.
#[derive(Debug, Clone, Default)]
pub struct MarketState {
    pub odds: OddsStore,
    pub arbitrages: ArbitrageStore,
    pub profit: ProfitAccumulator,
}

impl MarketState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state with custom retention windows (milliseconds).
    pub fn with_windows(arb_window_ms: i64, profit_window_ms: i64) -> Self {
        Self {
            odds: OddsStore::new(),
            arbitrages: ArbitrageStore::with_window(arb_window_ms),
            profit: ProfitAccumulator::with_window(profit_window_ms),
        }
    }

    pub fn get_odds(&self) -> &[QuoteRecord] {
        self.odds.list()
    }

    pub fn get_arbitrages(&self) -> Vec<&ArbitrageRecord> {
        self.arbitrages.list()
    }

    pub fn get_total_profit(&self) -> f64 {
        self.profit.total_profit()
    }

    pub fn get_cumulative_profits(&self) -> &[ProfitPoint] {
        self.profit.cumulative_profits()
    }

    /// An owned copy of every view, for handing to readers.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            odds: self.odds.list().to_vec(),
            arbitrages: self.arbitrages.list().into_iter().cloned().collect(),
            total_profit: self.profit.total_profit(),
            cumulative_profits: self.profit.cumulative_profits().to_vec(),
        }
    }
}

/// Owned, serialisable copy of all views at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub odds: Vec<QuoteRecord>,
    pub arbitrages: Vec<ArbitrageRecord>,
    pub total_profit: f64,
    pub cumulative_profits: Vec<ProfitPoint>,
}
