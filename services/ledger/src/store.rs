//! Durable store interface and the in-memory implementation
//!
//! The ledger and the lifecycle are built on these four operations only.
//! A store is trusted to apply an update completely or not at all.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use types::ball::BallEvent;
use types::fixture::{Match, MatchStatus};
use types::ids::MatchId;

use crate::error::StoreError;

/// Partial update applied to a stored match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchUpdate {
    pub status: Option<MatchStatus>,
    /// Event to push onto the tail of the commentary
    pub append: Option<BallEvent>,
}

impl MatchUpdate {
    pub fn status(status: MatchStatus) -> Self {
        Self {
            status: Some(status),
            append: None,
        }
    }

    pub fn append(event: BallEvent) -> Self {
        Self {
            status: None,
            append: Some(event),
        }
    }

    /// Apply to an in-memory match.
    pub fn apply_to(self, fixture: &mut Match) {
        if let Some(status) = self.status {
            fixture.status = status;
        }
        if let Some(event) = self.append {
            fixture.commentary.push(event);
        }
    }
}

/// Match persistence collaborator
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Insert a newly created match.
    async fn save(&self, fixture: Match) -> Result<(), StoreError>;

    async fn find_by_match_id(&self, match_id: &MatchId) -> Result<Option<Match>, StoreError>;

    /// All matches in allocation order (see `MatchId`'s `Ord`).
    async fn find_all(&self) -> Result<Vec<Match>, StoreError>;

    /// Apply a partial update, returning the match as stored afterwards,
    /// or `None` if the id is unknown.
    async fn update(
        &self,
        match_id: &MatchId,
        update: MatchUpdate,
    ) -> Result<Option<Match>, StoreError>;
}

/// Volatile store backed by a `BTreeMap`
#[derive(Debug, Default)]
pub struct MemoryStore {
    matches: RwLock<BTreeMap<MatchId, Match>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from already-materialized matches (used by journal replay).
    pub fn from_matches(matches: BTreeMap<MatchId, Match>) -> Self {
        Self {
            matches: RwLock::new(matches),
        }
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn save(&self, fixture: Match) -> Result<(), StoreError> {
        let mut matches = self.matches.write().await;
        if matches.contains_key(&fixture.match_id) {
            return Err(StoreError::Unavailable(format!(
                "duplicate match id {}",
                fixture.match_id
            )));
        }
        matches.insert(fixture.match_id.clone(), fixture);
        Ok(())
    }

    async fn find_by_match_id(&self, match_id: &MatchId) -> Result<Option<Match>, StoreError> {
        Ok(self.matches.read().await.get(match_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Match>, StoreError> {
        Ok(self.matches.read().await.values().cloned().collect())
    }

    async fn update(
        &self,
        match_id: &MatchId,
        update: MatchUpdate,
    ) -> Result<Option<Match>, StoreError> {
        let mut matches = self.matches.write().await;
        Ok(matches.get_mut(match_id).map(|fixture| {
            update.apply_to(fixture);
            fixture.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use types::fixture::NewMatch;

    fn fixture(seq: u64) -> Match {
        Match::new(
            MatchId::from_sequence(seq),
            NewMatch {
                team1: "England".to_string(),
                team2: "New Zealand".to_string(),
                venue: "Lord's".to_string(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = MemoryStore::new();
        store.save(fixture(1)).await.unwrap();

        let found = store.find_by_match_id(&MatchId::from_sequence(1)).await.unwrap();
        assert_eq!(found.unwrap().venue, "Lord's");
        assert!(store.find_by_match_id(&MatchId::from_sequence(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_save_rejected() {
        let store = MemoryStore::new();
        store.save(fixture(1)).await.unwrap();
        assert!(store.save(fixture(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_find_all_ordered_by_id() {
        let store = MemoryStore::new();
        store.save(fixture(2)).await.unwrap();
        store.save(fixture(1)).await.unwrap();

        let ids: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.match_id.to_string())
            .collect();
        assert_eq!(ids, vec!["0001", "0002"]);
    }

    #[tokio::test]
    async fn test_find_all_past_four_digits() {
        let store = MemoryStore::new();
        store.save(fixture(10000)).await.unwrap();
        store.save(fixture(9999)).await.unwrap();

        let ids: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.match_id.to_string())
            .collect();
        assert_eq!(ids, vec!["9999", "10000"]);
    }

    #[tokio::test]
    async fn test_update_unknown_match() {
        let store = MemoryStore::new();
        let result = store
            .update(&MatchId::from_sequence(9), MatchUpdate::status(MatchStatus::Paused))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = MemoryStore::new();
        store.save(fixture(1)).await.unwrap();

        let updated = store
            .update(&MatchId::from_sequence(1), MatchUpdate::status(MatchStatus::Paused))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_paused());
    }
}
