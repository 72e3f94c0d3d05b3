//! The match ledger
//!
//! Owns the rules for mutating a match: creation, ball appends and the
//! live/paused lifecycle. Mutations on one match run inside a per-match
//! critical section, so the paused check, the store write and listener
//! notification can never interleave with a concurrent pause or append on
//! the same match. Different matches never contend.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use types::ball::{BallEvent, BallSubmission};
use types::fixture::{Match, MatchStatus, NewMatch, Transition};
use types::ids::MatchId;

use crate::allocator::IdAllocator;
use crate::error::LedgerError;
use crate::store::{MatchStore, MatchUpdate};

/// Observer of committed ledger mutations
///
/// Called synchronously inside the match's critical section, after the
/// store accepted the change. Per match, calls arrive in commit order.
/// Implementations must not block.
pub trait LedgerListener: Send + Sync {
    fn ball_recorded(&self, fixture: &Match, event: &BallEvent);

    /// Called for every pause/resume request, including no-op ones.
    fn status_changed(&self, _fixture: &Match) {}
}

/// Result of a successful append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    pub event: BallEvent,
    /// The match as stored after the append
    pub fixture: Match,
}

/// A match's events in append order
///
/// Iterate as many times as needed; each `iter()` starts from the first
/// appended event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commentary {
    events: Vec<BallEvent>,
}

impl Commentary {
    pub fn new(events: Vec<BallEvent>) -> Self {
        Self { events }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BallEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Display order: latest `(over, ball)` first, later appends first
    /// among equal positions.
    pub fn most_recent_first(&self) -> Vec<&BallEvent> {
        let mut ordered: Vec<&BallEvent> = self.events.iter().collect();
        ordered.sort_by(|a, b| {
            (b.over, b.ball, b.position).cmp(&(a.over, a.ball, a.position))
        });
        ordered
    }

    pub fn into_vec(self) -> Vec<BallEvent> {
        self.events
    }
}

impl<'a> IntoIterator for &'a Commentary {
    type Item = &'a BallEvent;
    type IntoIter = std::slice::Iter<'a, BallEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Append-only ledger over a `MatchStore`
pub struct Ledger {
    store: Arc<dyn MatchStore>,
    allocator: Arc<dyn IdAllocator>,
    locks: DashMap<MatchId, Arc<Mutex<()>>>,
    listeners: Vec<Arc<dyn LedgerListener>>,
}

impl Ledger {
    pub fn new(store: Arc<dyn MatchStore>, allocator: Arc<dyn IdAllocator>) -> Self {
        Self {
            store,
            allocator,
            locks: DashMap::new(),
            listeners: Vec::new(),
        }
    }

    /// Register a listener. Listeners are notified in registration order.
    pub fn with_listener(mut self, listener: Arc<dyn LedgerListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Start a new match: allocate an id, stamp the start time, store it.
    pub async fn create_match(&self, details: NewMatch) -> Result<Match, LedgerError> {
        let details = details.validate()?;

        let match_id = self.allocator.next_match_id().await.map_err(|e| {
            error!(error = %e, "Match id allocation failed");
            LedgerError::from(e)
        })?;

        let fixture = Match::new(match_id, details, Utc::now());
        self.store.save(fixture.clone()).await.map_err(|e| {
            error!(match_id = %fixture.match_id, error = %e, "Failed to store new match");
            LedgerError::from(e)
        })?;

        info!(
            match_id = %fixture.match_id,
            team1 = %fixture.team1,
            team2 = %fixture.team2,
            venue = %fixture.venue,
            "Match started"
        );
        Ok(fixture)
    }

    pub async fn get_match(&self, match_id: &MatchId) -> Result<Match, LedgerError> {
        self.store
            .find_by_match_id(match_id)
            .await?
            .ok_or_else(|| LedgerError::MatchNotFound {
                match_id: match_id.clone(),
            })
    }

    pub async fn list_matches(&self) -> Result<Vec<Match>, LedgerError> {
        Ok(self.store.find_all().await?)
    }

    /// Events of a match in append order.
    pub async fn read(&self, match_id: &MatchId) -> Result<Commentary, LedgerError> {
        let fixture = self.get_match(match_id).await?;
        Ok(Commentary::new(fixture.commentary))
    }

    /// Validate and append a ball event.
    ///
    /// `(over, ball)` is stored as submitted: no renumbering, and no check
    /// against earlier events.
    pub async fn append(
        &self,
        match_id: &MatchId,
        submission: BallSubmission,
    ) -> Result<Appended, LedgerError> {
        let ball = submission.validate().map_err(|e| {
            debug!(match_id = %match_id, error = %e, "Rejected ball submission");
            LedgerError::from(e)
        })?;

        let lock = self.match_lock(match_id).await?;
        let _guard = lock.lock().await;

        let current = self.get_match(match_id).await?;
        if !current.status.accepts_events() {
            warn!(match_id = %match_id, "Append rejected: match is paused");
            return Err(LedgerError::MatchPaused {
                match_id: match_id.clone(),
            });
        }

        // Never step backwards, even if the wall clock does
        let now = Utc::now();
        let timestamp = current.last_event_time().map_or(now, |last| last.max(now));
        let event = ball.into_event(current.next_position(), timestamp);

        let fixture = self
            .store
            .update(match_id, MatchUpdate::append(event.clone()))
            .await
            .map_err(|e| {
                error!(match_id = %match_id, error = %e, "Failed to append ball event");
                LedgerError::from(e)
            })?
            .ok_or_else(|| LedgerError::MatchNotFound {
                match_id: match_id.clone(),
            })?;

        info!(
            match_id = %match_id,
            position = event.position,
            over = event.over,
            ball = event.ball,
            event_type = %event.event_type,
            "Ball recorded"
        );

        for listener in &self.listeners {
            listener.ball_recorded(&fixture, &event);
        }

        Ok(Appended { event, fixture })
    }

    /// `live -> paused`. Pausing a paused match succeeds without change.
    pub async fn pause(&self, match_id: &MatchId) -> Result<Match, LedgerError> {
        self.transition(match_id, MatchStatus::pause).await
    }

    /// `paused -> live`. Resuming a live match succeeds without change.
    pub async fn resume(&self, match_id: &MatchId) -> Result<Match, LedgerError> {
        self.transition(match_id, MatchStatus::resume).await
    }

    async fn transition(
        &self,
        match_id: &MatchId,
        step: fn(&mut MatchStatus) -> Transition,
    ) -> Result<Match, LedgerError> {
        let lock = self.match_lock(match_id).await?;
        let _guard = lock.lock().await;

        let current = self.get_match(match_id).await?;
        let mut status = current.status;

        let fixture = match step(&mut status) {
            Transition::Unchanged => {
                debug!(match_id = %match_id, ?status, "Status unchanged");
                current
            }
            Transition::Changed => {
                let updated = self
                    .store
                    .update(match_id, MatchUpdate::status(status))
                    .await?
                    .ok_or_else(|| LedgerError::MatchNotFound {
                        match_id: match_id.clone(),
                    })?;
                info!(match_id = %match_id, ?status, "Match status changed");
                updated
            }
        };

        for listener in &self.listeners {
            listener.status_changed(&fixture);
        }

        Ok(fixture)
    }

    /// Critical section for a stored match. Unknown ids fail before an
    /// entry is made, so the lock table only ever holds real matches.
    async fn match_lock(&self, match_id: &MatchId) -> Result<Arc<Mutex<()>>, LedgerError> {
        if let Some(lock) = self.locks.get(match_id) {
            return Ok(lock.clone());
        }
        self.get_match(match_id).await?;
        Ok(self.locks.entry(match_id.clone()).or_default().clone())
    }
}
