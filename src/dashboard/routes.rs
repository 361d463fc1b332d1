//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `DashboardState`, which
//! holds the process-wide `AppState` and read-side settings.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::view::{self, MatchGroup};
use crate::state::AppState;
use crate::types::{ArbitrageRecord, ProfitPoint, QuoteRecord};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State accessible by all route handlers.
#[derive(Clone)]
pub struct DashboardState {
    pub shared: AppState,
    /// Cap on `/api/arbitrages`.
    pub max_arbitrages: usize,
    pub started_at: DateTime<Utc>,
}

impl DashboardState {
    pub fn new(shared: AppState, max_arbitrages: usize) -> Self {
        Self {
            shared,
            max_arbitrages,
            started_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ProfitResponse {
    pub total_profit: f64,
    pub cumulative_profits: Vec<ProfitPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub quotes: usize,
    pub closed_quotes: usize,
    pub live_arbitrages: usize,
    pub total_profit: f64,
    pub revision: u64,
    pub routed: u64,
    pub rejected: u64,
    pub uptime_secs: i64,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/odds
pub async fn get_odds(State(state): State<DashboardState>) -> Json<Vec<QuoteRecord>> {
    let market = state.shared.read().await;
    Json(market.get_odds().to_vec())
}

/// GET /api/odds/grouped
pub async fn get_grouped_odds(State(state): State<DashboardState>) -> Json<Vec<MatchGroup>> {
    let market = state.shared.read().await;
    Json(view::group_by_match(market.get_odds()))
}

/// GET /api/arbitrages
pub async fn get_arbitrages(State(state): State<DashboardState>) -> Json<Vec<ArbitrageRecord>> {
    let market = state.shared.read().await;
    Json(view::latest_arbitrages(&market.arbitrages, state.max_arbitrages))
}

/// GET /api/profit
pub async fn get_profit(State(state): State<DashboardState>) -> Json<ProfitResponse> {
    let market = state.shared.read().await;
    Json(ProfitResponse {
        total_profit: market.get_total_profit(),
        cumulative_profits: market.get_cumulative_profits().to_vec(),
    })
}

/// GET /api/status
pub async fn get_status(State(state): State<DashboardState>) -> Json<StatusResponse> {
    let (market, stats) = state.shared.read_with_stats().await;

    Json(StatusResponse {
        quotes: market.odds.len(),
        closed_quotes: market.get_odds().iter().filter(|q| q.is_closed()).count(),
        live_arbitrages: market.arbitrages.len(),
        total_profit: market.get_total_profit(),
        revision: state.shared.revision(),
        routed: stats.routed,
        rejected: stats.rejected,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
