//! Error types for boundary validation
//!
//! Validation is purely local shape-checking of a single submission. Any
//! failure here is raised before the ledger is touched.

use thiserror::Error;

/// A submitted ball or match could not be turned into a typed value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid ball position: over {over}, ball {ball}")]
    InvalidBallPosition { over: i64, ball: i64 },

    #[error("Invalid event type: {0}")]
    InvalidEventType(String),

    #[error("Invalid runs: {0}")]
    InvalidRuns(i64),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
