//! Read-side projections used by the query surface.
//!
//! These shape store contents for display (grouping, ordering, capping)
//! without changing what the stores hold.

use serde::Serialize;

use crate::store::ArbitrageStore;
use crate::types::{ArbitrageRecord, QuoteRecord};

/// Default number of arbitrages shown.
pub const DEFAULT_MAX_ARBITRAGES: usize = 10;

/// All quotes for one match, in store order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchGroup {
    #[serde(rename = "match")]
    pub matchup: String,
    pub quotes: Vec<QuoteRecord>,
}

/// Group quotes by match. Groups appear in the order their match was
/// first seen.
pub fn group_by_match(quotes: &[QuoteRecord]) -> Vec<MatchGroup> {
    let mut groups: Vec<MatchGroup> = Vec::new();
    for quote in quotes {
        match groups.iter_mut().find(|g| g.matchup == quote.matchup) {
            Some(group) => group.quotes.push(quote.clone()),
            None => groups.push(MatchGroup {
                matchup: quote.matchup.clone(),
                quotes: vec![quote.clone()],
            }),
        }
    }
    groups
}

/// The `limit` most recent arbitrages, newest first. Ties are broken by
/// id so the order is stable across calls.
pub fn latest_arbitrages(store: &ArbitrageStore, limit: usize) -> Vec<ArbitrageRecord> {
    let mut arbs = store.list();
    arbs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
    arbs.into_iter().take(limit).cloned().collect()
}
