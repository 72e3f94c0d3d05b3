//! Aggregate fold over ball events
//!
//! `Scorer` applies events one at a time; `aggregate` is the same fold run
//! over a whole ledger. Because both paths share `Scorer::apply`, a view
//! built incrementally as events arrive is identical to one rebuilt from
//! scratch by a late joiner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use types::ball::{BallEvent, EventType};

use crate::figures::{BattingFigures, BowlingFigures, BowlingTally};

/// Runs assumed for a bye or leg bye recorded without a run count.
pub const DEFAULT_EXTRA_RUNS: u32 = 1;

/// Penalty run for a wide or no-ball.
pub const ILLEGAL_DELIVERY_PENALTY: u32 = 1;

/// Bowler who delivered the latest ball in play order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentBowler {
    pub name: String,
    #[serde(flatten)]
    pub figures: BowlingFigures,
}

/// Derived statistics for one match
///
/// Never a source of truth: always recomputable from the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateView {
    pub total_runs: u64,
    pub batsmen: BTreeMap<String, BattingFigures>,
    pub bowlers: BTreeMap<String, BowlingFigures>,
    pub current_bowler: Option<CurrentBowler>,
}

impl AggregateView {
    /// Batsmen ordered by runs, highest first; ties keep name order.
    pub fn batting_by_runs(&self) -> Vec<(&str, &BattingFigures)> {
        let mut order: Vec<(&str, &BattingFigures)> =
            self.batsmen.iter().map(|(name, f)| (name.as_str(), f)).collect();
        order.sort_by(|a, b| b.1.runs.cmp(&a.1.runs));
        order
    }
}

/// Incremental scorer
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    total_runs: u64,
    batsmen: BTreeMap<String, BattingFigures>,
    bowlers: BTreeMap<String, BowlingTally>,
    /// `(over, ball, position)` of the latest attributed delivery
    latest_bowled: Option<((u32, u8, u64), String)>,
    events_applied: u64,
}

impl Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the running totals.
    pub fn apply(&mut self, event: &BallEvent) {
        let runs = event.runs.unwrap_or(0);

        match event.event_type {
            EventType::Run => {
                self.total_runs += u64::from(runs);
                self.batting(event, |b| {
                    b.runs += u64::from(runs);
                    b.balls_faced += 1;
                    match runs {
                        4 => b.fours += 1,
                        6 => b.sixes += 1,
                        _ => {}
                    }
                });
                self.bowling(event, |t| {
                    t.runs += u64::from(runs);
                    t.balls_bowled += 1;
                });
            }
            EventType::Wicket => {
                self.batting(event, |b| b.balls_faced += 1);
                self.bowling(event, |t| {
                    t.wickets += 1;
                    t.balls_bowled += 1;
                });
            }
            EventType::Wide | EventType::NoBall => {
                self.total_runs += u64::from(ILLEGAL_DELIVERY_PENALTY);
                let counts = event.event_type.counts_toward_over();
                self.bowling(event, |t| {
                    t.runs += u64::from(ILLEGAL_DELIVERY_PENALTY);
                    if counts {
                        t.balls_bowled += 1;
                    }
                });
            }
            EventType::Bye | EventType::LegBye => {
                let extras = event.runs.unwrap_or(DEFAULT_EXTRA_RUNS);
                self.total_runs += u64::from(extras);
                self.batting(event, |b| b.balls_faced += 1);
                self.bowling(event, |t| t.balls_bowled += 1);
            }
        }

        if let Some(bowler) = &event.bowler {
            let key = (event.over, event.ball, event.position);
            let is_latest = self
                .latest_bowled
                .as_ref()
                .map_or(true, |(latest, _)| key >= *latest);
            if is_latest {
                self.latest_bowled = Some((key, bowler.clone()));
            }
        }

        self.events_applied += 1;
    }

    /// Number of events folded so far.
    pub fn events_applied(&self) -> u64 {
        self.events_applied
    }

    /// Materialize the current view. Overs are derived here.
    pub fn view(&self) -> AggregateView {
        let bowlers: BTreeMap<String, BowlingFigures> = self
            .bowlers
            .iter()
            .map(|(name, tally)| (name.clone(), tally.figures()))
            .collect();

        let current_bowler = self.latest_bowled.as_ref().and_then(|(_, name)| {
            bowlers.get(name).map(|figures| CurrentBowler {
                name: name.clone(),
                figures: *figures,
            })
        });

        AggregateView {
            total_runs: self.total_runs,
            batsmen: self.batsmen.clone(),
            bowlers,
            current_bowler,
        }
    }

    fn batting(&mut self, event: &BallEvent, update: impl FnOnce(&mut BattingFigures)) {
        if let Some(name) = &event.batsman {
            update(self.batsmen.entry(name.clone()).or_default());
        }
    }

    fn bowling(&mut self, event: &BallEvent, update: impl FnOnce(&mut BowlingTally)) {
        if let Some(name) = &event.bowler {
            update(self.bowlers.entry(name.clone()).or_default());
        }
    }
}

/// Fold an ordered event sequence into an aggregate view.
///
/// Total over any sequence of valid events; the empty sequence gives an
/// all-zero view with no current bowler.
pub fn aggregate<'a, I>(events: I) -> AggregateView
where
    I: IntoIterator<Item = &'a BallEvent>,
{
    let mut scorer = Scorer::new();
    for event in events {
        scorer.apply(event);
    }
    scorer.view()
}
