//! Recent-event cache
//!
//! Keeps the newest ball events per match for cheap "last few balls"
//! reads. Best-effort only: the ledger stays the source of truth, and a
//! missing or failing cache never fails an append.

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use ledger::LedgerListener;
use thiserror::Error;
use tracing::{debug, warn};
use types::ball::BallEvent;
use types::fixture::Match;
use types::ids::MatchId;

/// Events retained per match.
pub const RECENT_EVENT_LIMIT: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Recent-event cache unavailable: {0}")]
    Unavailable(String),
}

pub trait RecentEventCache: Send + Sync {
    /// Remember `event` as the newest for `match_id`.
    fn put(&self, match_id: &MatchId, event: &BallEvent) -> Result<(), CacheError>;

    /// Up to `RECENT_EVENT_LIMIT` events, newest first.
    fn get_recent(&self, match_id: &MatchId) -> Result<Vec<BallEvent>, CacheError>;
}

/// Bounded per-match ring, newest at the front
#[derive(Debug, Default)]
pub struct InMemoryRecentCache {
    entries: DashMap<MatchId, VecDeque<BallEvent>>,
}

impl InMemoryRecentCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecentEventCache for InMemoryRecentCache {
    fn put(&self, match_id: &MatchId, event: &BallEvent) -> Result<(), CacheError> {
        let mut recent = self.entries.entry(match_id.clone()).or_default();
        recent.push_front(event.clone());
        recent.truncate(RECENT_EVENT_LIMIT);
        Ok(())
    }

    fn get_recent(&self, match_id: &MatchId) -> Result<Vec<BallEvent>, CacheError> {
        Ok(self
            .entries
            .get(match_id)
            .map(|recent| recent.iter().cloned().collect())
            .unwrap_or_default())
    }
}

/// Injected cache state
#[derive(Clone, Default)]
pub enum CacheHandle {
    Available(Arc<dyn RecentEventCache>),
    #[default]
    Unavailable,
}

impl CacheHandle {
    pub fn in_memory() -> Self {
        CacheHandle::Available(Arc::new(InMemoryRecentCache::new()))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, CacheHandle::Available(_))
    }

    /// Store an event; failures are logged and dropped.
    pub fn record(&self, match_id: &MatchId, event: &BallEvent) {
        let CacheHandle::Available(cache) = self else {
            debug!(match_id = %match_id, "Recent-event cache disabled, skipping put");
            return;
        };
        if let Err(e) = cache.put(match_id, event) {
            warn!(match_id = %match_id, error = %e, "Recent-event cache put failed");
        }
    }

    /// Newest-first recent events; empty when the cache is off or failing.
    pub fn recent(&self, match_id: &MatchId) -> Vec<BallEvent> {
        let CacheHandle::Available(cache) = self else {
            return Vec::new();
        };
        cache.get_recent(match_id).unwrap_or_else(|e| {
            warn!(match_id = %match_id, error = %e, "Recent-event cache read failed");
            Vec::new()
        })
    }
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheHandle::Available(_) => f.write_str("CacheHandle::Available"),
            CacheHandle::Unavailable => f.write_str("CacheHandle::Unavailable"),
        }
    }
}

impl LedgerListener for CacheHandle {
    fn ball_recorded(&self, fixture: &Match, event: &BallEvent) {
        self.record(&fixture.match_id, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use types::ball::EventType;

    fn event(position: u64) -> BallEvent {
        BallEvent {
            position,
            over: (position / 6) as u32,
            ball: (position % 6) as u8,
            event_type: EventType::Run,
            runs: Some(0),
            batsman: None,
            bowler: None,
            description: None,
            timestamp: Utc::now(),
        }
    }

    struct BrokenCache;

    impl RecentEventCache for BrokenCache {
        fn put(&self, _: &MatchId, _: &BallEvent) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        fn get_recent(&self, _: &MatchId) -> Result<Vec<BallEvent>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn test_keeps_newest_ten() {
        let cache = InMemoryRecentCache::new();
        let id = MatchId::from_sequence(1);
        for position in 0..15 {
            cache.put(&id, &event(position)).unwrap();
        }

        let positions: Vec<u64> = cache.get_recent(&id).unwrap().iter().map(|e| e.position).collect();
        assert_eq!(positions, (5..15).rev().collect::<Vec<u64>>());
    }

    #[test]
    fn test_matches_are_separate() {
        let cache = InMemoryRecentCache::new();
        cache.put(&MatchId::from_sequence(1), &event(0)).unwrap();

        assert!(cache.get_recent(&MatchId::from_sequence(2)).unwrap().is_empty());
        assert_eq!(cache.get_recent(&MatchId::from_sequence(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_unavailable_handle_is_silent() {
        let handle = CacheHandle::Unavailable;
        let id = MatchId::from_sequence(1);
        handle.record(&id, &event(0));
        assert!(handle.recent(&id).is_empty());
        assert!(!handle.is_available());
    }

    #[test]
    fn test_failing_cache_is_swallowed() {
        let handle = CacheHandle::Available(Arc::new(BrokenCache));
        let id = MatchId::from_sequence(1);
        handle.record(&id, &event(0));
        assert!(handle.recent(&id).is_empty());
    }

    #[test]
    fn test_handle_records_through_listener() {
        let handle = CacheHandle::in_memory();
        let m = Match::new(
            MatchId::from_sequence(4),
            types::fixture::NewMatch {
                team1: "Ireland".to_string(),
                team2: "Scotland".to_string(),
                venue: "Malahide".to_string(),
            },
            Utc::now(),
        );
        handle.ball_recorded(&m, &event(0));
        handle.ball_recorded(&m, &event(1));

        let recent = handle.recent(&m.match_id);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].position, 1);
    }
}
