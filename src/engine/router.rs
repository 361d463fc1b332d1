//! Message router: dispatches feed envelopes to the stores.
//!
//! The router is the only component aware of all three stores:
//! - `quote_update` → odds store upsert
//! - `arb_detection` → arbitrage store upsert + quote annotation
//! - `arb_execution` → as above, plus profit for terminal statuses
//!
//! Contents are decoded before any store is touched, so a rejected
//! envelope leaves the state exactly as it was.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::store::MarketState;
use crate::types::{ArbitrageRecord, Envelope, MessageType, MonitorError, QuoteRecord};

/// What a successfully routed envelope did to the state.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// A quote was inserted or replaced.
    Quote,
    /// An arbitrage was stored and cross-wired into the other stores.
    Arbitrage {
        /// Quotes annotated with the arbitrage status.
        annotated: usize,
        /// Arbitrages evicted by the write.
        evicted: usize,
        /// Profit realised by a terminal execution.
        profit: Option<f64>,
    },
}

pub struct MessageRouter;

impl MessageRouter {
    /// Route one envelope into `state`.
    ///
    /// Unknown tags and undecodable contents return an error and mutate
    /// nothing; the caller decides how to surface them.
    pub fn route(state: &mut MarketState, envelope: &Envelope) -> Result<RouteOutcome, MonitorError> {
        let kind = envelope.kind()?;

        match kind {
            MessageType::QuoteUpdate => {
                let quote: QuoteRecord = decode(kind, &envelope.contents)?;
                state.odds.upsert(quote);
                Ok(RouteOutcome::Quote)
            }
            MessageType::ArbDetection | MessageType::ArbExecution => {
                let mut arb: ArbitrageRecord = decode(kind, &envelope.contents)?;
                let profit = arb.profit().ok_or_else(|| MonitorError::InvalidContents {
                    message_type: kind.to_string(),
                    reason: "missing field `guaranteed_profit` or `guaranteed_payout`".to_string(),
                })?;
                arb.guaranteed_profit = Some(profit);
                Ok(Self::route_arbitrage(state, kind, arb, profit))
            }
        }
    }

    fn route_arbitrage(
        state: &mut MarketState,
        kind: MessageType,
        arb: ArbitrageRecord,
        arb_profit: f64,
    ) -> RouteOutcome {
        let annotated = state.odds.apply_arb_status(&arb);

        let profit = (kind == MessageType::ArbExecution && arb.status.is_terminal())
            .then_some(arb_profit);
        if let Some(delta) = profit {
            state.profit.record(delta, arb.timestamp);
        }

        debug!(
            message_type = %kind,
            arb_id = %arb.id,
            status = %arb.status,
            annotated,
            "Arbitrage routed"
        );
        let evicted = state.arbitrages.upsert(arb);

        RouteOutcome::Arbitrage {
            annotated,
            evicted,
            profit,
        }
    }
}

fn decode<T: DeserializeOwned>(kind: MessageType, contents: &serde_json::Value) -> Result<T, MonitorError> {
    serde_json::from_value(contents.clone()).map_err(|e| MonitorError::InvalidContents {
        message_type: kind.to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
