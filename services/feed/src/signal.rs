//! Signals pushed to match subscribers
//!
//! Wire shape: `{"event": "commentary" | "matchUpdate", "data": ...}`.

use serde::{Deserialize, Serialize};
use types::ball::BallEvent;

use crate::snapshot::MatchSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum Signal {
    /// A newly appended ball event
    Commentary(BallEvent),
    /// The match after a change, with recomputed statistics
    MatchUpdate(Box<MatchSnapshot>),
}

/// Signal discriminant, for logging and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Commentary,
    MatchUpdate,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Commentary => "commentary",
            SignalKind::MatchUpdate => "matchUpdate",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Commentary(_) => SignalKind::Commentary,
            Signal::MatchUpdate(_) => SignalKind::MatchUpdate,
        }
    }

    pub fn match_update(snapshot: MatchSnapshot) -> Self {
        Signal::MatchUpdate(Box::new(snapshot))
    }
}
