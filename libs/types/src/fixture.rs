//! Match (fixture) types and the live/paused lifecycle

use crate::ball::BallEvent;
use crate::errors::ValidationError;
use crate::ids::MatchId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Match status
///
/// `Live` is the initial state. There are no automatic transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Live,
    Paused,
}

/// Outcome of a lifecycle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    /// Already in the target state; nothing to write
    Unchanged,
}

impl MatchStatus {
    /// `live -> paused`; idempotent.
    pub fn pause(&mut self) -> Transition {
        self.move_to(MatchStatus::Paused)
    }

    /// `paused -> live`; idempotent.
    pub fn resume(&mut self) -> Transition {
        self.move_to(MatchStatus::Live)
    }

    /// Whether new ball events may be appended.
    pub fn accepts_events(&self) -> bool {
        matches!(self, MatchStatus::Live)
    }

    fn move_to(&mut self, target: MatchStatus) -> Transition {
        if *self == target {
            Transition::Unchanged
        } else {
            *self = target;
            Transition::Changed
        }
    }
}

/// Descriptive fields supplied when a match is started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub team1: String,
    pub team2: String,
    pub venue: String,
}

impl NewMatch {
    pub fn validate(self) -> Result<Self, ValidationError> {
        let required = |value: String, field: &'static str| {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                Err(ValidationError::MissingField(field))
            } else {
                Ok(trimmed)
            }
        };

        Ok(Self {
            team1: required(self.team1, "team1")?,
            team2: required(self.team2, "team2")?,
            venue: required(self.venue, "venue")?,
        })
    }
}

/// A match and its ordered commentary ledger
///
/// Only the ledger mutates `status` and `commentary`; everything else is
/// fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub match_id: MatchId,
    pub team1: String,
    pub team2: String,
    pub venue: String,
    pub start_time: DateTime<Utc>,
    pub status: MatchStatus,
    /// Append-ordered ball events
    pub commentary: Vec<BallEvent>,
}

impl Match {
    pub fn new(match_id: MatchId, details: NewMatch, start_time: DateTime<Utc>) -> Self {
        Self {
            match_id,
            team1: details.team1,
            team2: details.team2,
            venue: details.venue,
            start_time,
            status: MatchStatus::Live,
            commentary: Vec::new(),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.status == MatchStatus::Paused
    }

    /// Position the next appended event will take.
    pub fn next_position(&self) -> u64 {
        self.commentary.len() as u64
    }

    /// Timestamp of the most recently appended event.
    pub fn last_event_time(&self) -> Option<DateTime<Utc>> {
        self.commentary.last().map(|e| e.timestamp)
    }
}
