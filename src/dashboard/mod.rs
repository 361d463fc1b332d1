//! Dashboard: Axum web server exposing the views as JSON.
//!
//! Read-only: handlers take the shared read lock and never mutate.
//! CORS allows GET from any origin so a separate UI can poll it.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub use routes::DashboardState;

/// Bind `port` and serve the dashboard until the process exits.
pub async fn serve(state: DashboardState, port: u16) -> Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;

    info!(port, "Dashboard server starting on http://localhost:{port}");
    axum::serve(listener, build_router(state))
        .await
        .context("Dashboard server error")
}

/// Start the dashboard web server in the background.
pub fn spawn_dashboard(state: DashboardState, port: u16) {
    tokio::spawn(async move {
        if let Err(e) = serve(state, port).await {
            error!(error = %e, "Dashboard stopped");
        }
    });
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: DashboardState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/odds", get(routes::get_odds))
        .route("/api/odds/grouped", get(routes::get_grouped_odds))
        .route("/api/arbitrages", get(routes::get_arbitrages))
        .route("/api/profit", get(routes::get_profit))
        .route("/api/status", get(routes::get_status))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
