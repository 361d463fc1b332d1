//! Core engine: envelope routing and read-side projections.

pub mod router;
pub mod view;

pub use router::{MessageRouter, RouteOutcome};
