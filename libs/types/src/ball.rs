//! Ball-level commentary events
//!
//! A `BallSubmission` is the untyped shape a client sends. It becomes a
//! `ValidatedBall` after boundary validation, and a `BallEvent` once the
//! ledger stamps it with a position and a timestamp. Only `BallEvent`s are
//! ever stored or folded into statistics.

use crate::errors::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest ball index accepted at submission time.
///
/// Balls are indexed 0-5; 6 is tolerated transiently at the entry boundary.
pub const MAX_BALL_INDEX: i64 = 6;

/// Kind of delivery outcome recorded by a commentary event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Runs off the bat (0 allowed)
    Run,
    /// Batsman dismissed
    Wicket,
    /// Illegal delivery, not part of the six-ball over
    Wide,
    /// Illegal delivery that still counts toward the over
    NoBall,
    /// Runs without the bat touching the ball
    Bye,
    /// Runs off the batsman's body
    LegBye,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Run,
        EventType::Wicket,
        EventType::Wide,
        EventType::NoBall,
        EventType::Bye,
        EventType::LegBye,
    ];

    /// Wire name, as used in JSON payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Run => "run",
            EventType::Wicket => "wicket",
            EventType::Wide => "wide",
            EventType::NoBall => "no_ball",
            EventType::Bye => "bye",
            EventType::LegBye => "leg_bye",
        }
    }

    /// Whether the delivery counts toward the bowler's balls bowled.
    pub fn counts_toward_over(&self) -> bool {
        !matches!(self, EventType::Wide)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidEventType(s.to_string()))
    }
}

/// Candidate event as submitted by a scorer, before validation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallSubmission {
    pub over: i64,
    pub ball: i64,
    pub event_type: String,
    #[serde(default)]
    pub runs: Option<i64>,
    #[serde(default)]
    pub batsman: Option<String>,
    #[serde(default)]
    pub bowler: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl BallSubmission {
    /// Shape-check the submission.
    ///
    /// Does not look at other events: duplicate or out-of-order
    /// `(over, ball)` pairs are the caller's business.
    pub fn validate(self) -> Result<ValidatedBall, ValidationError> {
        let invalid_position = || ValidationError::InvalidBallPosition {
            over: self.over,
            ball: self.ball,
        };

        if self.ball < 0 || self.ball > MAX_BALL_INDEX {
            return Err(invalid_position());
        }
        let over = u32::try_from(self.over).map_err(|_| invalid_position())?;
        let ball = self.ball as u8;

        let event_type: EventType = self.event_type.parse()?;

        let runs = match self.runs {
            Some(r) => Some(u32::try_from(r).map_err(|_| ValidationError::InvalidRuns(r))?),
            None => None,
        };

        Ok(ValidatedBall {
            over,
            ball,
            event_type,
            runs,
            batsman: normalize_name(self.batsman),
            bowler: normalize_name(self.bowler),
            description: self.description,
        })
    }
}

/// Blank names mean "unattributed".
fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// A submission that passed validation but has not been appended yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBall {
    pub over: u32,
    pub ball: u8,
    pub event_type: EventType,
    pub runs: Option<u32>,
    pub batsman: Option<String>,
    pub bowler: Option<String>,
    pub description: Option<String>,
}

impl ValidatedBall {
    /// Freeze into a ledger event at the given append position.
    pub fn into_event(self, position: u64, timestamp: DateTime<Utc>) -> BallEvent {
        BallEvent {
            position,
            over: self.over,
            ball: self.ball,
            event_type: self.event_type,
            runs: self.runs,
            batsman: self.batsman,
            bowler: self.bowler,
            description: self.description,
            timestamp,
        }
    }
}

/// An appended, immutable commentary event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallEvent {
    /// Zero-based append index within the match
    pub position: u64,
    pub over: u32,
    pub ball: u8,
    pub event_type: EventType,
    pub runs: Option<u32>,
    pub batsman: Option<String>,
    pub bowler: Option<String>,
    pub description: Option<String>,
    /// Ledger append time, non-decreasing within a match
    pub timestamp: DateTime<Utc>,
}

impl BallEvent {
    /// `(over, ball)` pair as recorded by the scorer.
    pub fn play_position(&self) -> (u32, u8) {
        (self.over, self.ball)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(over: i64, ball: i64, event_type: &str) -> BallSubmission {
        BallSubmission {
            over,
            ball,
            event_type: event_type.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_event_type_wire_names() {
        for kind in EventType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<EventType>().unwrap(), kind);
        }
    }

    #[test]
    fn test_only_wide_is_outside_the_over() {
        assert!(!EventType::Wide.counts_toward_over());
        assert!(EventType::NoBall.counts_toward_over());
        assert!(EventType::Bye.counts_toward_over());
    }

    #[test]
    fn test_validate_accepts_ball_six() {
        let ball = submission(3, 6, "run").validate().unwrap();
        assert_eq!((ball.over, ball.ball), (3, 6));
    }

    #[test]
    fn test_validate_rejects_bad_positions() {
        for (over, ball) in [(-1, 0), (0, -1), (0, 7), (i64::from(u32::MAX) + 1, 0)] {
            let err = submission(over, ball, "run").validate().unwrap_err();
            assert_eq!(err, ValidationError::InvalidBallPosition { over, ball });
        }
    }

    #[test]
    fn test_validate_rejects_unknown_event_type() {
        let err = submission(0, 0, "dead_ball").validate().unwrap_err();
        assert_eq!(err, ValidationError::InvalidEventType("dead_ball".to_string()));

        // Wire names are case sensitive
        assert!(submission(0, 0, "RUN").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_runs() {
        let mut sub = submission(0, 1, "run");
        sub.runs = Some(-4);
        assert_eq!(sub.validate().unwrap_err(), ValidationError::InvalidRuns(-4));
    }

    #[test]
    fn test_blank_names_become_unattributed() {
        let mut sub = submission(0, 1, "run");
        sub.batsman = Some("   ".to_string());
        sub.bowler = Some(" Starc ".to_string());
        let ball = sub.validate().unwrap();
        assert_eq!(ball.batsman, None);
        assert_eq!(ball.bowler.as_deref(), Some("Starc"));
    }

    #[test]
    fn test_submission_from_camel_case_json() {
        let json = r#"{"over":2,"ball":3,"eventType":"leg_bye","runs":2,"bowler":"Cummins"}"#;
        let sub: BallSubmission = serde_json::from_str(json).unwrap();
        let ball = sub.validate().unwrap();
        assert_eq!(ball.event_type, EventType::LegBye);
        assert_eq!(ball.runs, Some(2));
        assert_eq!(ball.batsman, None);
    }

    #[test]
    fn test_into_event_keeps_fields() {
        let now = Utc::now();
        let event = submission(1, 2, "wicket").validate().unwrap().into_event(5, now);
        assert_eq!(event.position, 5);
        assert_eq!(event.play_position(), (1, 2));
        assert_eq!(event.timestamp, now);
        assert_eq!(event.event_type, EventType::Wicket);
    }
}
