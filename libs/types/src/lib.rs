//! Types library for the live cricket scoreboard
//!
//! Shared definitions used by the ledger, the scoring engine, the fan-out
//! feed and the gateway. Everything that crosses a crate boundary lives
//! here so that a `BallEvent` means the same thing everywhere.
//!
//! # Modules
//! - `ids`: Match identifiers
//! - `ball`: Ball submissions, validation, and appended ball events
//! - `fixture`: Matches and the live/paused lifecycle
//! - `errors`: Validation error taxonomy

pub mod ids;
pub mod ball;
pub mod fixture;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::ball::*;
    pub use crate::fixture::*;
    pub use crate::errors::*;
}
