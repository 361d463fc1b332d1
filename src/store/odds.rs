//! Odds store: the latest quote for every (match, bookmaker).
//!
//! Records are kept in first-seen order so that downstream consumers
//! grouping by match get a stable layout. Quotes are never removed; a
//! closed quote stays as a record with `odds == None`.

use tracing::debug;

use crate::types::{ArbitrageRecord, QuoteRecord};

#[derive(Debug, Clone, Default)]
pub struct OddsStore {
    quotes: Vec<QuoteRecord>,
}

impl OddsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the quote for its (match, bookmaker).
    ///
    /// A fresh quote always clears any arbitrage annotation: the annotation
    /// referred to the odds it supersedes.
    pub fn upsert(&mut self, quote: QuoteRecord) {
        let quote = QuoteRecord {
            arb_status: None,
            ..quote
        };

        match self.quotes.iter_mut().find(|q| q.same_key(&quote)) {
            Some(existing) => {
                debug!(matchup = %quote.matchup, bookmaker = %quote.bookmaker, "Quote replaced");
                *existing = quote;
            }
            None => {
                debug!(matchup = %quote.matchup, bookmaker = %quote.bookmaker, "Quote added");
                self.quotes.push(quote);
            }
        }
    }

    /// Annotate the quotes that form a leg of `arb` with its status.
    ///
    /// Only `detected` and `completed` can annotate a quote; any other
    /// status is a no-op. Never creates records. Returns how many quotes
    /// were annotated.
    pub fn apply_arb_status(&mut self, arb: &ArbitrageRecord) -> usize {
        let Some(status) = arb.status.quote_status() else {
            return 0;
        };

        let mut annotated = 0;
        for quote in self.quotes.iter_mut().filter(|q| arb.has_leg(q)) {
            quote.arb_status = Some(status);
            annotated += 1;
        }

        if annotated > 0 {
            debug!(arb_id = %arb.id, status = %arb.status, annotated, "Quotes annotated");
        }
        annotated
    }

    /// All quotes in first-seen order.
    pub fn list(&self) -> &[QuoteRecord] {
        &self.quotes
    }

    /// The quote for a given (match, bookmaker), if any.
    pub fn get(&self, matchup: &str, bookmaker: &str) -> Option<&QuoteRecord> {
        self.quotes
            .iter()
            .find(|q| q.matchup == matchup && q.bookmaker == bookmaker)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
