//! Match ledger service
//!
//! Append-only record of every ball bowled in every match, plus the
//! live/paused lifecycle that gates appends.
//!
//! # Modules
//! - `ledger`: Creation, append, read and pause/resume under per-match locks
//! - `store`: `MatchStore` collaborator and the in-memory store
//! - `journal`: CRC-framed append-only file store with crash recovery
//! - `allocator`: Match id allocation
//! - `error`: Error taxonomy

pub mod allocator;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod store;

pub use allocator::{CounterAllocator, IdAllocator};
pub use error::{AllocatorError, LedgerError, StoreError};
pub use journal::{JournalRecord, JournalStore, ReplayReport};
pub use ledger::{Appended, Commentary, Ledger, LedgerListener};
pub use store::{MatchStore, MatchUpdate, MemoryStore};
