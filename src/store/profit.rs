//! Profit accumulator: running total and windowed cumulative series.
//!
//! `total_profit` is the lifetime sum of every recorded delta. The display
//! series holds cumulative values, but only for points within the window
//! of the most recent event; the window filters what is shown, not what
//! is summed. Time advances only when a new profit event arrives.

use tracing::info;

use super::PROFIT_WINDOW_MS;
use crate::types::ProfitPoint;

#[derive(Debug, Clone)]
pub struct ProfitAccumulator {
    total_profit: f64,
    cumulative_profits: Vec<ProfitPoint>,
    window_ms: i64,
}

impl Default for ProfitAccumulator {
    fn default() -> Self {
        Self::with_window(PROFIT_WINDOW_MS)
    }
}

impl ProfitAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window_ms: i64) -> Self {
        Self {
            total_profit: 0.0,
            cumulative_profits: Vec::new(),
            window_ms,
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Record a realised profit (or loss) at `timestamp` (epoch ms).
    ///
    /// The new point chains from the last display point, so values of
    /// evicted points are still carried forward.
    pub fn record(&mut self, profit_delta: f64, timestamp: i64) {
        self.total_profit += profit_delta;

        let last = self.cumulative_profits.last().map_or(0.0, |p| p.profit);
        self.cumulative_profits.push(ProfitPoint {
            timestamp,
            profit: last + profit_delta,
        });

        let window_ms = self.window_ms;
        self.cumulative_profits
            .retain(|p| timestamp.saturating_sub(p.timestamp) <= window_ms);

        info!(
            delta = format!("${profit_delta:.2}"),
            total = format!("${:.2}", self.total_profit),
            points = self.cumulative_profits.len(),
            "Profit recorded"
        );
    }

    pub fn total_profit(&self) -> f64 {
        self.total_profit
    }

    /// Display series, oldest first.
    pub fn cumulative_profits(&self) -> &[ProfitPoint] {
        &self.cumulative_profits
    }

    /// The most recent cumulative value, or 0 if nothing was recorded.
    pub fn latest(&self) -> f64 {
        self.cumulative_profits.last().map_or(0.0, |p| p.profit)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_running_total() {
        let mut acc = ProfitAccumulator::new();
        let t0 = 1_700_000_000_000;
        acc.record(50.0, t0);
        acc.record(30.0, t0 + 1_000);
        acc.record(-20.0, t0 + 2_000);

        assert_eq!(acc.total_profit(), 60.0);
        assert_eq!(acc.cumulative_profits().len(), 3);
        assert_eq!(acc.cumulative_profits()[2].profit, 60.0);
        assert_eq!(acc.latest(), 60.0);
    }

    #[test]
    fn test_points_are_cumulative() {
        let mut acc = ProfitAccumulator::new();
        acc.record(10.0, 1);
        acc.record(5.0, 2);

        let profits: Vec<f64> = acc.cumulative_profits().iter().map(|p| p.profit).collect();
        assert_eq!(profits, vec![10.0, 15.0]);
    }

    #[test]
    fn test_window_prunes_with_continuity() {
        let mut acc = ProfitAccumulator::new();
        let now = 1_700_000_000_000;
        acc.record(50.0, now - PROFIT_WINDOW_MS - 1_000);
        acc.record(30.0, now);

        let series = acc.cumulative_profits();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].profit, 80.0);
        assert_eq!(series[0].timestamp, now);
        assert_eq!(acc.total_profit(), 80.0);
    }

    #[test]
    fn test_point_at_window_edge_kept() {
        let mut acc = ProfitAccumulator::new();
        acc.record(1.0, 0);
        acc.record(1.0, PROFIT_WINDOW_MS);
        assert_eq!(acc.cumulative_profits().len(), 2);
    }

    #[test]
    fn test_total_may_go_negative() {
        let mut acc = ProfitAccumulator::new();
        acc.record(-25.0, 0);
        assert_eq!(acc.total_profit(), -25.0);
        assert_eq!(acc.latest(), -25.0);
    }

    #[test]
    fn test_window_only_advances_on_record() {
        let mut acc = ProfitAccumulator::with_window(1_000);
        acc.record(5.0, 0);
        // Nothing else is recorded, so the old point stays visible.
        assert_eq!(acc.cumulative_profits().len(), 1);

        acc.record(5.0, 10_000);
        assert_eq!(acc.cumulative_profits().len(), 1);
        assert_eq!(acc.cumulative_profits()[0].profit, 10.0);
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = ProfitAccumulator::new();
        assert_eq!(acc.total_profit(), 0.0);
        assert!(acc.cumulative_profits().is_empty());
        assert_eq!(acc.latest(), 0.0);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let mut acc = ProfitAccumulator::new();
        acc.record(1.0, i64::MIN);
        acc.record(1.0, 0);
        assert_eq!(acc.cumulative_profits().len(), 1);
        assert_eq!(acc.latest(), 2.0);

        acc.record(1.0, i64::MAX);
        assert_eq!(acc.cumulative_profits().len(), 1);
        acc.record(1.0, i64::MIN);
        assert_eq!(acc.cumulative_profits().len(), 2);
        assert_eq!(acc.total_profit(), 4.0);
        assert_eq!(acc.latest(), 4.0);
    }
}
