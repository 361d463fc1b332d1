//! Shared types for the ARBMONITOR views.
//!
//! These types form the data model used across all modules: the quote
//! and arbitrage records carried by the feed, the profit series points,
//! and the envelope every feed message arrives in. Wire names follow
//! the upstream JSON format exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Kind of quote event published by the odds scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteEvent {
    #[serde(alias = "odds_update")]
    QuoteUpdate,
    #[serde(alias = "odds_close")]
    QuoteClose,
}

impl fmt::Display for QuoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteEvent::QuoteUpdate => write!(f, "quote_update"),
            QuoteEvent::QuoteClose => write!(f, "quote_close"),
        }
    }
}

/// Two-way decimal odds offered by one bookmaker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteOdds {
    pub home_win: f64,
    pub away_win: f64,
}

/// Arbitrage annotation on a single quote.
///
/// Only the states that describe a specific quote are representable;
/// administrative arbitrage outcomes (`adjusted`, `cancelled`) never
/// reach a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteArbStatus {
    /// An arbitrage was detected using this exact quote.
    Detected,
    /// An arbitrage was completed using this exact quote.
    Completed,
}

/// The latest known quote for one (match, bookmaker) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub event: QuoteEvent,
    #[serde(rename = "match")]
    pub matchup: String,
    pub bookmaker: String,
    /// `None` when the quote was closed or withdrawn.
    pub odds: Option<QuoteOdds>,
    /// Set by the odds store, never taken from the wire.
    #[serde(default, skip_deserializing)]
    pub arb_status: Option<QuoteArbStatus>,
    /// Epoch milliseconds. Older scrapers omit it.
    #[serde(default)]
    pub timestamp: i64,
}

impl QuoteRecord {
    /// Whether this quote has been closed (no odds on offer).
    pub fn is_closed(&self) -> bool {
        self.odds.is_none()
    }

    /// Whether this record and `other` share the (match, bookmaker) identity.
    pub fn same_key(&self, other: &QuoteRecord) -> bool {
        self.matchup == other.matchup && self.bookmaker == other.bookmaker
    }

    /// Helper to build a test quote with sensible defaults.
    #[cfg(test)]
    pub fn sample(matchup: &str, bookmaker: &str, home_win: f64, away_win: f64) -> Self {
        QuoteRecord {
            event: QuoteEvent::QuoteUpdate,
            matchup: matchup.to_string(),
            bookmaker: bookmaker.to_string(),
            odds: Some(QuoteOdds { home_win, away_win }),
            arb_status: None,
            timestamp: 0,
        }
    }
}

impl fmt::Display for QuoteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.odds {
            Some(o) => write!(
                f,
                "[{}] {} home={:.2} away={:.2}",
                self.bookmaker, self.matchup, o.home_win, o.away_win
            ),
            None => write!(f, "[{}] {} closed", self.bookmaker, self.matchup),
        }
    }
}

// ---------------------------------------------------------------------------
// Arbitrages
// ---------------------------------------------------------------------------

/// Lifecycle status of an arbitrage opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbStatus {
    Detected,
    Completed,
    Cancelled,
    Adjusted,
}

impl ArbStatus {
    /// Terminal statuses resolve the opportunity and realise its profit.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ArbStatus::Detected)
    }

    /// The annotation this status maps to on a quote, if it has one.
    pub fn quote_status(&self) -> Option<QuoteArbStatus> {
        match self {
            ArbStatus::Detected => Some(QuoteArbStatus::Detected),
            ArbStatus::Completed => Some(QuoteArbStatus::Completed),
            ArbStatus::Cancelled | ArbStatus::Adjusted => None,
        }
    }
}

impl fmt::Display for ArbStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArbStatus::Detected => write!(f, "Detected"),
            ArbStatus::Completed => write!(f, "Completed"),
            ArbStatus::Cancelled => write!(f, "Cancelled"),
            ArbStatus::Adjusted => write!(f, "Adjusted"),
        }
    }
}

/// A two-leg arbitrage: back home at one bookmaker, away at another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageRecord {
    pub id: String,
    #[serde(rename = "match")]
    pub matchup: String,
    pub home_win_bookmaker: String,
    pub away_win_bookmaker: String,
    /// `None` when the home leg was withdrawn before execution.
    #[serde(default)]
    pub home_win_odds: Option<f64>,
    /// `None` when the away leg was withdrawn before execution.
    #[serde(default)]
    pub away_win_odds: Option<f64>,
    pub home_win_stake: f64,
    pub away_win_stake: f64,
    /// Precomputed profit. Older gateways send only the payout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guaranteed_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guaranteed_payout: Option<f64>,
    pub status: ArbStatus,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl ArbitrageRecord {
    /// Total amount staked across both legs.
    pub fn total_stake(&self) -> f64 {
        self.home_win_stake + self.away_win_stake
    }

    /// Guaranteed profit: the explicit field when present, otherwise the
    /// payout net of both stakes. `None` when neither is on the record.
    pub fn profit(&self) -> Option<f64> {
        self.guaranteed_profit
            .or_else(|| self.guaranteed_payout.map(|payout| payout - self.total_stake()))
    }

    /// Whether `quote` is one leg of this arbitrage.
    ///
    /// A leg is identified by match, bookmaker and the exact odds value on
    /// that side. Closed quotes and withdrawn legs never match.
    pub fn has_leg(&self, quote: &QuoteRecord) -> bool {
        if quote.matchup != self.matchup {
            return false;
        }
        let Some(odds) = quote.odds else {
            return false;
        };
        let home = quote.bookmaker == self.home_win_bookmaker
            && self.home_win_odds == Some(odds.home_win);
        let away = quote.bookmaker == self.away_win_bookmaker
            && self.away_win_odds == Some(odds.away_win);
        home || away
    }

    /// Helper to build a test arbitrage with sensible defaults.
    #[cfg(test)]
    pub fn sample(id: &str, status: ArbStatus, timestamp: i64) -> Self {
        ArbitrageRecord {
            id: id.to_string(),
            matchup: "Team A vs Team B".to_string(),
            home_win_bookmaker: "Bookmaker 1".to_string(),
            away_win_bookmaker: "Bookmaker 2".to_string(),
            home_win_odds: Some(2.0),
            away_win_odds: Some(3.5),
            home_win_stake: 100.0,
            away_win_stake: 57.14,
            guaranteed_profit: Some(20.0),
            guaranteed_payout: None,
            status,
            timestamp,
        }
    }
}

impl fmt::Display for ArbitrageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}@{} / {}@{} profit=${:.2} ({})",
            self.id,
            self.matchup,
            self.home_win_bookmaker,
            fmt_odds(self.home_win_odds),
            self.away_win_bookmaker,
            fmt_odds(self.away_win_odds),
            self.profit().unwrap_or(0.0),
            self.status,
        )
    }
}

fn fmt_odds(odds: Option<f64>) -> String {
    odds.map(|o| format!("{o:.2}")).unwrap_or_else(|| "-".to_string())
}

// ---------------------------------------------------------------------------
// Profit
// ---------------------------------------------------------------------------

/// One point of the cumulative profit series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitPoint {
    /// Epoch milliseconds of the event that realised the profit.
    pub timestamp: i64,
    /// Running total at this point, not the delta.
    pub profit: f64,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Message kinds understood by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    QuoteUpdate,
    ArbDetection,
    ArbExecution,
}

impl MessageType {
    pub const ALL: &'static [MessageType] = &[
        MessageType::QuoteUpdate,
        MessageType::ArbDetection,
        MessageType::ArbExecution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::QuoteUpdate => "quote_update",
            MessageType::ArbDetection => "arb_detection",
            MessageType::ArbExecution => "arb_execution",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a wire tag into a MessageType. `odds_update` is the legacy tag.
impl std::str::FromStr for MessageType {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "odds_update" {
            return Ok(MessageType::QuoteUpdate);
        }
        MessageType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| MonitorError::UnknownMessageType(s.to_string()))
    }
}

/// A decoded feed message. `contents` stays raw until the router knows
/// which record type the tag calls for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub message_type: String,
    pub contents: serde_json::Value,
}

impl Envelope {
    /// Build an envelope from a known tag and a serialisable record.
    pub fn new<T: Serialize>(kind: MessageType, contents: &T) -> Result<Self, MonitorError> {
        let contents = serde_json::to_value(contents).map_err(|e| MonitorError::InvalidContents {
            message_type: kind.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Envelope {
            message_type: kind.to_string(),
            contents,
        })
    }

    /// The message kind, if the tag is one the router understands.
    pub fn kind(&self) -> Result<MessageType, MonitorError> {
        self.message_type.parse()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Recoverable failures. None of these stop the feed.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("Invalid {message_type} contents: {reason}")]
    InvalidContents { message_type: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_deserializes_from_wire() {
        let quote: QuoteRecord = serde_json::from_value(json!({
            "event": "quote_update",
            "match": "A vs B",
            "bookmaker": "X",
            "odds": {"home_win": 2.0, "away_win": 3.5},
            "timestamp": 1700000000000i64
        }))
        .unwrap();
        assert_eq!(quote.matchup, "A vs B");
        assert_eq!(quote.odds, Some(QuoteOdds { home_win: 2.0, away_win: 3.5 }));
        assert_eq!(quote.arb_status, None);
        assert_eq!(quote.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_quote_ignores_wire_arb_status() {
        let quote: QuoteRecord = serde_json::from_value(json!({
            "event": "quote_update",
            "match": "A vs B",
            "bookmaker": "X",
            "odds": null,
            "arb_status": "completed"
        }))
        .unwrap();
        assert_eq!(quote.arb_status, None);
        assert!(quote.is_closed());
        assert_eq!(quote.timestamp, 0);
    }

    #[test]
    fn test_quote_event_legacy_aliases() {
        let e: QuoteEvent = serde_json::from_str("\"odds_close\"").unwrap();
        assert_eq!(e, QuoteEvent::QuoteClose);
        let e: QuoteEvent = serde_json::from_str("\"odds_update\"").unwrap();
        assert_eq!(e, QuoteEvent::QuoteUpdate);
        assert_eq!(serde_json::to_string(&e).unwrap(), "\"quote_update\"");
    }

    #[test]
    fn test_quote_serializes_match_field() {
        let quote = QuoteRecord::sample("A vs B", "X", 2.0, 3.5);
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["match"], "A vs B");
        assert!(json["arb_status"].is_null());
    }

    #[test]
    fn test_arb_status_terminal() {
        assert!(!ArbStatus::Detected.is_terminal());
        assert!(ArbStatus::Completed.is_terminal());
        assert!(ArbStatus::Adjusted.is_terminal());
        assert!(ArbStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_arb_status_quote_mapping() {
        assert_eq!(ArbStatus::Detected.quote_status(), Some(QuoteArbStatus::Detected));
        assert_eq!(ArbStatus::Completed.quote_status(), Some(QuoteArbStatus::Completed));
        assert_eq!(ArbStatus::Adjusted.quote_status(), None);
        assert_eq!(ArbStatus::Cancelled.quote_status(), None);
    }

    #[test]
    fn test_arbitrage_with_null_leg() {
        let arb: ArbitrageRecord = serde_json::from_value(json!({
            "id": "arb-1",
            "match": "A vs B",
            "home_win_bookmaker": "X",
            "away_win_bookmaker": "Y",
            "home_win_odds": null,
            "away_win_odds": 3.5,
            "home_win_stake": 0,
            "away_win_stake": 50,
            "guaranteed_profit": -50,
            "status": "cancelled",
            "timestamp": 1
        }))
        .unwrap();
        assert_eq!(arb.home_win_odds, None);
        assert_eq!(arb.status, ArbStatus::Cancelled);
        assert!((arb.total_stake() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_has_leg_home_and_away() {
        let arb = ArbitrageRecord::sample("arb-1", ArbStatus::Detected, 0);
        let home = QuoteRecord::sample("Team A vs Team B", "Bookmaker 1", 2.0, 1.5);
        let away = QuoteRecord::sample("Team A vs Team B", "Bookmaker 2", 1.2, 3.5);
        let stale = QuoteRecord::sample("Team A vs Team B", "Bookmaker 1", 2.1, 1.5);
        let other_match = QuoteRecord::sample("Team C vs Team D", "Bookmaker 1", 2.0, 1.5);
        assert!(arb.has_leg(&home));
        assert!(arb.has_leg(&away));
        assert!(!arb.has_leg(&stale));
        assert!(!arb.has_leg(&other_match));
    }

    #[test]
    fn test_profit_prefers_explicit_field() {
        let mut arb = ArbitrageRecord::sample("arb-1", ArbStatus::Completed, 0);
        arb.guaranteed_payout = Some(500.0);
        assert_eq!(arb.profit(), Some(20.0));
    }

    #[test]
    fn test_profit_from_payout() {
        let arb: ArbitrageRecord = serde_json::from_value(json!({
            "id": "arb-1",
            "match": "A vs B",
            "home_win_bookmaker": "X",
            "away_win_bookmaker": "Y",
            "home_win_odds": 2.2,
            "away_win_odds": 2.2,
            "home_win_stake": 50,
            "away_win_stake": 50,
            "guaranteed_payout": 110,
            "status": "completed",
            "timestamp": 1
        }))
        .unwrap();
        assert_eq!(arb.guaranteed_profit, None);
        assert!((arb.profit().unwrap() - 10.0).abs() < 1e-10);

        let bare = ArbitrageRecord {
            guaranteed_payout: None,
            ..arb
        };
        assert_eq!(bare.profit(), None);
    }

    #[test]
    fn test_has_leg_ignores_closed_quote() {
        let arb = ArbitrageRecord::sample("arb-1", ArbStatus::Detected, 0);
        let mut closed = QuoteRecord::sample("Team A vs Team B", "Bookmaker 1", 2.0, 1.5);
        closed.odds = None;
        assert!(!arb.has_leg(&closed));
    }

    #[test]
    fn test_message_type_parse() {
        assert_eq!("quote_update".parse::<MessageType>().unwrap(), MessageType::QuoteUpdate);
        assert_eq!("odds_update".parse::<MessageType>().unwrap(), MessageType::QuoteUpdate);
        assert_eq!("arb_execution".parse::<MessageType>().unwrap(), MessageType::ArbExecution);
        assert!(matches!(
            "unknown".parse::<MessageType>(),
            Err(MonitorError::UnknownMessageType(t)) if t == "unknown"
        ));
    }

    #[test]
    fn test_message_type_tags_round_trip() {
        for kind in MessageType::ALL {
            assert_eq!(kind.as_str().parse::<MessageType>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_envelope_new_and_kind() {
        let arb = ArbitrageRecord::sample("arb-1", ArbStatus::Detected, 5);
        let env = Envelope::new(MessageType::ArbDetection, &arb).unwrap();
        assert_eq!(env.message_type, "arb_detection");
        assert_eq!(env.kind().unwrap(), MessageType::ArbDetection);
        assert_eq!(env.contents["id"], "arb-1");
    }

    #[test]
    fn test_display_formats() {
        let quote = QuoteRecord::sample("A vs B", "X", 2.0, 3.5);
        assert_eq!(format!("{quote}"), "[X] A vs B home=2.00 away=3.50");
        let arb = ArbitrageRecord::sample("arb-1", ArbStatus::Completed, 0);
        let s = format!("{arb}");
        assert!(s.contains("arb-1"));
        assert!(s.contains("Completed"));
    }
}
