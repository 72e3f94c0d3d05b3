//! Scoring Engine
//!
//! Pure statistics over a match ledger: folds an ordered sequence of ball
//! events into batting figures, bowling figures, the current bowler and the
//! team total.
//!
//! **Key Invariants:**
//! - Deterministic: the same ledger always yields the same view
//! - Total: never fails on validated events, including the empty ledger
//! - Totals are order-independent; only the current bowler depends on
//!   `(over, ball)` and, for ties, append position
//! - Overs are derived from legal balls on every view build

pub mod figures;
pub mod scorer;

pub use figures::{BattingFigures, BowlingFigures, Overs};
pub use scorer::{aggregate, AggregateView, CurrentBowler, Scorer};
