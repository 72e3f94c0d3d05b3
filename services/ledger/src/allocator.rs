//! Match identifier allocation

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use types::ids::MatchId;

use crate::error::AllocatorError;

/// Hands out unique, monotonically increasing match ids
#[async_trait]
pub trait IdAllocator: Send + Sync {
    async fn next_match_id(&self) -> Result<MatchId, AllocatorError>;
}

/// In-process counter: "0001", "0002", ...
#[derive(Debug, Default)]
pub struct CounterAllocator {
    last: AtomicU64,
}

impl CounterAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume after `seq`, e.g. the highest id recovered from a journal.
    pub fn starting_after(seq: u64) -> Self {
        Self {
            last: AtomicU64::new(seq),
        }
    }
}

#[async_trait]
impl IdAllocator for CounterAllocator {
    async fn next_match_id(&self) -> Result<MatchId, AllocatorError> {
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map_err(|_| AllocatorError::Exhausted)?;
        Ok(MatchId::from_sequence(previous + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counter_starts_at_one() {
        let alloc = CounterAllocator::new();
        assert_eq!(alloc.next_match_id().await.unwrap().as_str(), "0001");
        assert_eq!(alloc.next_match_id().await.unwrap().as_str(), "0002");
    }

    #[tokio::test]
    async fn test_counter_resumes_after_seed() {
        let alloc = CounterAllocator::starting_after(41);
        assert_eq!(alloc.next_match_id().await.unwrap().as_str(), "0042");
    }

    #[tokio::test]
    async fn test_counter_exhaustion() {
        let alloc = CounterAllocator::starting_after(u64::MAX);
        assert_eq!(alloc.next_match_id().await.unwrap_err(), AllocatorError::Exhausted);
    }
}
