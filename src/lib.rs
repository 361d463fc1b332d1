//! ARBMONITOR: live odds, arbitrage and profit views
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod store;
pub mod engine;
pub mod state;
pub mod feed;
pub mod dashboard;
