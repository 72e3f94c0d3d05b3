//! Per-match publish/subscribe
//!
//! One bounded tokio `broadcast` channel per match, created on first
//! subscribe. Publishing never blocks: a subscriber that falls more than
//! `capacity` signals behind loses the oldest ones and is told to
//! reconcile from the ledger.

use dashmap::DashMap;
use ledger::LedgerListener;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use types::ball::BallEvent;
use types::fixture::Match;
use types::ids::MatchId;

use crate::signal::Signal;
use crate::snapshot::MatchSnapshot;

/// Default per-match channel capacity.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Publish/subscribe transport keyed by match
pub trait Broadcaster: Send + Sync {
    /// Deliver to current subscribers. Returns how many received it.
    fn publish(&self, match_id: &MatchId, signal: Signal) -> usize;

    /// Receive every signal published for `match_id` from now on.
    fn subscribe(&self, match_id: &MatchId) -> Subscription;
}

/// What a subscriber sees next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    Signal(Signal),
    /// `skipped` signals were dropped; state must be rebuilt from the ledger
    Lagged { skipped: u64 },
    /// The channel is gone
    Closed,
}

/// Receiving half of one match channel
#[derive(Debug)]
pub struct Subscription {
    match_id: MatchId,
    receiver: broadcast::Receiver<Signal>,
}

impl Subscription {
    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    pub async fn recv(&mut self) -> SubscriptionEvent {
        match self.receiver.recv().await {
            Ok(signal) => SubscriptionEvent::Signal(signal),
            Err(RecvError::Lagged(skipped)) => {
                warn!(match_id = %self.match_id, skipped, "Subscriber lagged");
                SubscriptionEvent::Lagged { skipped }
            }
            Err(RecvError::Closed) => SubscriptionEvent::Closed,
        }
    }
}

/// In-process `Broadcaster`
#[derive(Debug)]
pub struct FeedHub {
    channels: DashMap<MatchId, broadcast::Sender<Signal>>,
    capacity: usize,
}

impl FeedHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current subscriber count for a match.
    pub fn subscriber_count(&self, match_id: &MatchId) -> usize {
        self.channels
            .get(match_id)
            .map_or(0, |sender| sender.receiver_count())
    }

    /// Publish the full-state update for `fixture`, skipping the fold when
    /// nobody is listening.
    fn publish_update(&self, fixture: &Match) {
        if self.subscriber_count(&fixture.match_id) == 0 {
            debug!(match_id = %fixture.match_id, "No subscribers, matchUpdate skipped");
            return;
        }
        let snapshot = MatchSnapshot::build(fixture);
        self.publish(&fixture.match_id, Signal::match_update(snapshot));
    }
}

impl Default for FeedHub {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl Broadcaster for FeedHub {
    fn publish(&self, match_id: &MatchId, signal: Signal) -> usize {
        let Some(sender) = self.channels.get(match_id) else {
            return 0;
        };
        let kind = signal.kind();
        // Err only means there are no receivers right now
        let delivered = sender.send(signal).unwrap_or(0);
        debug!(match_id = %match_id, %kind, delivered, "Signal published");
        delivered
    }

    fn subscribe(&self, match_id: &MatchId) -> Subscription {
        let receiver = self
            .channels
            .entry(match_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();
        Subscription {
            match_id: match_id.clone(),
            receiver,
        }
    }
}

impl LedgerListener for FeedHub {
    fn ball_recorded(&self, fixture: &Match, event: &BallEvent) {
        self.publish(&fixture.match_id, Signal::Commentary(event.clone()));
        self.publish_update(fixture);
    }

    fn status_changed(&self, fixture: &Match) {
        self.publish_update(fixture);
    }
}
