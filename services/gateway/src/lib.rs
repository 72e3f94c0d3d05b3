//! Scoreboard gateway
//!
//! HTTP surface over the match ledger plus the WebSocket fan-out endpoint.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
