//! Score tally
//!
//! Lives outside any single round: pickups, ritual bonuses and dream readings
//! all feed the same running total.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Maximum number of recent deltas to keep
pub const MAX_HISTORY: usize = 10;

/// Where a score delta came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreSource {
    /// Player collected a pouch
    Pickup,
    /// Impulse ritual completed
    ImpulseBonus,
    /// Dream reading result
    Interpretation,
}

/// Consumer of score deltas
pub trait ScoreSink {
    fn on_score_delta(&mut self, points: i32, source: ScoreSource);
}

impl<T: ScoreSink> ScoreSink for Rc<RefCell<T>> {
    fn on_score_delta(&mut self, points: i32, source: ScoreSource) {
        self.borrow_mut().on_score_delta(points, source);
    }
}

/// A single recorded delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub points: i32,
    pub source: ScoreSource,
}

/// Running total with recent history (newest first)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreTally {
    pub total: i64,
    pub entries: Vec<TallyEntry>,
}

impl ScoreTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tally shareable between a session and the reading flow
    pub fn shared() -> Rc<RefCell<ScoreTally>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent delta (if any)
    pub fn last(&self) -> Option<&TallyEntry> {
        self.entries.first()
    }

    /// Sum of recorded deltas from one source (within history)
    pub fn recent_from(&self, source: ScoreSource) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.source == source)
            .map(|e| i64::from(e.points))
            .sum()
    }
}

impl ScoreSink for ScoreTally {
    fn on_score_delta(&mut self, points: i32, source: ScoreSource) {
        self.total += i64::from(points);
        self.entries.insert(0, TallyEntry { points, source });
        self.entries.truncate(MAX_HISTORY);
        log::debug!("Tally {:+} from {:?}, total {}", points, source, self.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_totals_and_history() {
        let mut tally = ScoreTally::new();
        assert!(tally.is_empty());
        tally.on_score_delta(15, ScoreSource::Pickup);
        tally.on_score_delta(-7, ScoreSource::Interpretation);
        tally.on_score_delta(10, ScoreSource::ImpulseBonus);
        assert_eq!(tally.total, 18);
        assert_eq!(tally.last().map(|e| e.source), Some(ScoreSource::ImpulseBonus));
        assert_eq!(tally.recent_from(ScoreSource::Interpretation), -7);
    }

    #[test]
    fn test_history_bounded() {
        let mut tally = ScoreTally::new();
        for i in 0..25 {
            tally.on_score_delta(i, ScoreSource::Pickup);
        }
        assert_eq!(tally.entries.len(), MAX_HISTORY);
        assert_eq!(tally.entries[0].points, 24);
        assert_eq!(tally.total, (0..25).sum::<i64>());
    }

    #[test]
    fn test_shared_tally_sink() {
        let shared = ScoreTally::shared();
        let mut sink = Rc::clone(&shared);
        sink.on_score_delta(8, ScoreSource::Pickup);
        assert_eq!(shared.borrow().total, 8);
    }
}
