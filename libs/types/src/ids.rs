//! Identifier types for scoreboard entities
//!
//! Match identifiers are human-readable, zero-padded decimal strings handed
//! out by an allocator ("0001", "0002", ...). They are opaque to everything
//! except the allocator, which may parse them back to recover its counter.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Width of the zero-padded decimal form.
pub const MATCH_ID_WIDTH: usize = 4;

/// Externally visible match identifier
///
/// Assigned once at creation and never changed. Ids past 9999 simply grow
/// wider; padding never truncates.
///
/// Ordering is by allocation: allocator-form ids compare numerically
/// ("9999" < "10000") and sort ahead of any other id, which compare as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Wrap an id received from a client or a store.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Format an allocator sequence number as a match id.
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("{:0width$}", seq, width = MATCH_ID_WIDTH))
    }

    /// Numeric value of the id, if it is in allocator form.
    pub fn sequence(&self) -> Option<u64> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for MatchId {
    fn cmp(&self, other: &Self) -> Ordering {
        let key = |id: &MatchId| {
            let seq = id.sequence();
            (seq.is_none(), seq)
        };
        key(self)
            .cmp(&key(other))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for MatchId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_id_zero_padding() {
        assert_eq!(MatchId::from_sequence(1).as_str(), "0001");
        assert_eq!(MatchId::from_sequence(42).as_str(), "0042");
        assert_eq!(MatchId::from_sequence(9999).as_str(), "9999");
    }

    #[test]
    fn test_match_id_grows_past_four_digits() {
        assert_eq!(MatchId::from_sequence(10000).as_str(), "10000");
    }

    #[test]
    fn test_match_id_sequence_parse() {
        assert_eq!(MatchId::new("0007").sequence(), Some(7));
        assert_eq!(MatchId::new("abc").sequence(), None);
        assert_eq!(MatchId::new("").sequence(), None);
        assert_eq!(MatchId::new("-1").sequence(), None);
    }

    #[test]
    fn test_match_id_orders_by_sequence() {
        let mut ids = vec![
            MatchId::new("friendly"),
            MatchId::from_sequence(10000),
            MatchId::from_sequence(9999),
            MatchId::new("7"),
            MatchId::from_sequence(7),
        ];
        ids.sort();
        let ids: Vec<&str> = ids.iter().map(MatchId::as_str).collect();
        assert_eq!(ids, vec!["0007", "7", "9999", "10000", "friendly"]);
    }

    #[test]
    fn test_match_id_serialization() {
        let id = MatchId::from_sequence(3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0003\"");

        let deserialized: MatchId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
