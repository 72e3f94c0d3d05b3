//! Match snapshots for `matchUpdate` signals and late-joiner reconciliation
//!
//! A snapshot pairs the match record with the aggregate view recomputed from
//! its whole ledger. The checksum covers the view and the ledger length, so
//! a viewer that rebuilt its state from `read` + `aggregate` can compare
//! against any later live snapshot.

use scoring::{aggregate, AggregateView};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use types::fixture::Match;

/// A match plus its recomputed statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    #[serde(rename = "match")]
    pub fixture: Match,
    pub stats: AggregateView,
    /// Ledger length the stats were folded from.
    pub event_count: u64,
    /// SHA-256 over `stats` and `event_count`, lowercase hex.
    pub checksum: String,
}

impl MatchSnapshot {
    /// Fold the full ledger of `fixture` and seal the result.
    pub fn build(fixture: &Match) -> Self {
        let stats = aggregate(&fixture.commentary);
        Self::from_parts(fixture.clone(), stats)
    }

    /// Seal an already computed view. `stats` must come from `fixture`'s ledger.
    pub fn from_parts(fixture: Match, stats: AggregateView) -> Self {
        let event_count = fixture.commentary.len() as u64;
        let checksum = compute_checksum(&stats, event_count);
        Self {
            fixture,
            stats,
            event_count,
            checksum,
        }
    }
}

/// SHA-256 over the view's fields in map order, then the event count.
///
/// `BTreeMap` iteration keeps the byte stream identical for identical views.
pub fn compute_checksum(stats: &AggregateView, event_count: u64) -> String {
    let mut hasher = Sha256::new();

    hasher.update(stats.total_runs.to_le_bytes());
    hasher.update(b"---");

    for (name, b) in &stats.batsmen {
        hasher.update(name.as_bytes());
        hasher.update(b":");
        hasher.update(format!("{}/{}/{}/{}", b.runs, b.balls_faced, b.fours, b.sixes).as_bytes());
        hasher.update(b"|");
    }
    hasher.update(b"---");

    for (name, f) in &stats.bowlers {
        hasher.update(name.as_bytes());
        hasher.update(b":");
        hasher.update(format!("{}/{}/{}", f.runs, f.wickets, f.balls_bowled).as_bytes());
        hasher.update(b"|");
    }
    hasher.update(b"---");

    if let Some(current) = &stats.current_bowler {
        hasher.update(current.name.as_bytes());
    }
    hasher.update(b"---");

    hasher.update(event_count.to_le_bytes());

    format!("{:x}", hasher.finalize())
}

/// Check that a snapshot's checksum matches its content.
pub fn verify_snapshot(snapshot: &MatchSnapshot) -> bool {
    snapshot.checksum == compute_checksum(&snapshot.stats, snapshot.event_count)
}
