//! Outcome resolution
//!
//! Pure function of a terminal snapshot. No mutation.

use serde::{Deserialize, Serialize};

use super::session::RoundSnapshot;
use super::state::{RoundResult, TerminationReason, Variant};

/// Final result plus why the round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub result: RoundResult,
    pub reason: TerminationReason,
}

/// Resolve a round that has left `Active`.
///
/// Returns `None` while the round has no termination reason yet.
/// - Collection: win only on a strictly higher score (ties lose)
/// - Impulse: win only if the threshold was reached before time ran out
pub fn resolve(snapshot: &RoundSnapshot) -> Option<Outcome> {
    let reason = snapshot.termination_reason?;
    let won = match snapshot.variant {
        Variant::Collection => snapshot.human.score > snapshot.opponent.score,
        Variant::Impulse => {
            reason == TerminationReason::ImpulseThresholdReached
                && snapshot.counter.threshold_reached()
        }
    };
    let result = if won {
        RoundResult::Win
    } else {
        RoundResult::Lose
    };
    Some(Outcome { result, reason })
}
