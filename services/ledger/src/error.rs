//! Ledger error taxonomy
//!
//! Every failure leaves the ledger untouched: validation runs before the
//! store is consulted, and the store update is the single mutating step.

use std::io;

use thiserror::Error;
use types::errors::ValidationError;
use types::ids::MatchId;

/// Failure of the durable store collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Journal corrupt at byte offset {offset}: {detail}")]
    Corrupt { offset: u64, detail: String },
}

/// Failure of the identifier allocator collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocatorError {
    #[error("Match id sequence exhausted")]
    Exhausted,

    #[error("Allocator unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: MatchId },

    #[error("Match is paused: {match_id}")]
    MatchPaused { match_id: MatchId },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Match creation failed: {0}")]
    MatchCreationFailed(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        LedgerError::StorageUnavailable(err.to_string())
    }
}

impl From<AllocatorError> for LedgerError {
    fn from(err: AllocatorError) -> Self {
        LedgerError::MatchCreationFailed(err.to_string())
    }
}
