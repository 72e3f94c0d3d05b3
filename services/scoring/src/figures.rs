//! Per-player figures
//!
//! Batting figures are accumulated directly. Bowling is accumulated as a
//! raw tally and only turned into `BowlingFigures` (with overs) when a view
//! is built, so the overs notation is never stored incrementally.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Legal deliveries per over.
pub const BALLS_PER_OVER: u32 = 6;

/// Batting line for one batsman
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingFigures {
    pub runs: u64,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
}

/// Raw bowling accumulation, before overs are derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BowlingTally {
    pub runs: u64,
    pub wickets: u32,
    pub balls_bowled: u32,
}

impl BowlingTally {
    pub(crate) fn figures(&self) -> BowlingFigures {
        BowlingFigures {
            runs: self.runs,
            wickets: self.wickets,
            balls_bowled: self.balls_bowled,
            overs: Overs::from_balls(self.balls_bowled),
        }
    }
}

/// Bowling line for one bowler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingFigures {
    pub runs: u64,
    pub wickets: u32,
    pub balls_bowled: u32,
    pub overs: Overs,
}

/// Overs in cricket notation: `1.2` is one over and two balls
///
/// The fractional part counts balls, not tenths of an over, so it never
/// exceeds `.5`. Serialized as a JSON number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Overs {
    pub completed: u32,
    pub balls: u8,
}

impl Overs {
    pub fn from_balls(balls_bowled: u32) -> Self {
        Self {
            completed: balls_bowled / BALLS_PER_OVER,
            balls: (balls_bowled % BALLS_PER_OVER) as u8,
        }
    }

    /// `floor(balls/6) + (balls mod 6)/10`
    pub fn as_f64(&self) -> f64 {
        self.completed as f64 + self.balls as f64 / 10.0
    }

    pub fn total_balls(&self) -> u32 {
        self.completed * BALLS_PER_OVER + self.balls as u32
    }
}

impl fmt::Display for Overs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.completed, self.balls)
    }
}

impl Serialize for Overs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Overs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() || value < 0.0 {
            return Err(serde::de::Error::custom(format!("invalid overs value {}", value)));
        }
        let completed = value.trunc();
        let balls = ((value - completed) * 10.0).round();
        if balls >= BALLS_PER_OVER as f64 {
            return Err(serde::de::Error::custom(format!("invalid overs value {}", value)));
        }
        Ok(Self {
            completed: completed as u32,
            balls: balls as u8,
        })
    }
}
