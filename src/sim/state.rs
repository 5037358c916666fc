//! Round state types
//!
//! Phases, variants, participants and the impulse counter. Everything a
//! presentation layer needs to draw a round is serializable.

use serde::{Deserialize, Serialize};

/// Phase of a round.
///
/// Ordered: a round only ever walks forward through
/// `Select < Prepare < Active < Resolving < Finished`, and `Finished -> Select`
/// is the single reset edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Phase {
    /// Waiting for a participant to be chosen and confirmed
    Select,
    /// Fixed setup delay before play (paper figure being folded, field being laid out)
    Prepare,
    /// Countdown running, input accepted
    Active,
    /// Round over, short resolution delay (burn animation / last pickup shown)
    Resolving,
    /// Result available until reset
    Finished,
}

/// Which mini-game the session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Race a greedy opponent for collectibles on the hillside
    Collection,
    /// Land enough impulses on the paper figure before time runs out
    Impulse,
}

/// Why the round left `Active`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    TimeExpired,
    FieldExhausted,
    ImpulseThresholdReached,
}

/// Final result of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResult {
    Win,
    Lose,
}

/// Avatar picked for the collection race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contestant {
    Male,
    Female,
}

/// Practitioner picked to perform the impulse ritual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Practitioner {
    /// Veteran under the bridge
    GrannyChan,
    /// Forty years of experience
    GrannyLee,
    /// Family craft passed down
    GrannyWong,
}

impl Practitioner {
    pub const ALL: [Practitioner; 3] = [
        Practitioner::GrannyChan,
        Practitioner::GrannyLee,
        Practitioner::GrannyWong,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Practitioner::GrannyChan => "Granny Chan",
            Practitioner::GrannyLee => "Granny Lee",
            Practitioner::GrannyWong => "Granny Wong",
        }
    }

    pub fn specialty(&self) -> &'static str {
        match self {
            Practitioner::GrannyChan => "Drives off petty people",
            Practitioner::GrannyLee => "Clears bad luck",
            Practitioner::GrannyWong => "Breaks ill omens",
        }
    }
}

/// A participant chosen during `Select`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Participant {
    Contestant(Contestant),
    Practitioner(Practitioner),
}

impl Participant {
    /// Whether this participant belongs to the given variant
    pub fn fits(&self, variant: Variant) -> bool {
        matches!(
            (self, variant),
            (Participant::Contestant(_), Variant::Collection)
                | (Participant::Practitioner(_), Variant::Impulse)
        )
    }
}

/// Progress message tier shown while striking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressTier {
    /// Under a quarter of the way
    Stubborn,
    Wavering,
    Yielding,
    FinalPush,
    Done,
}

/// Impulse-variant scoring: accepted impulses against a threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpulseCounter {
    pub count: u32,
    pub threshold: u32,
    /// Remaining health of the struck figure, saturating at zero
    pub target_health: u32,
}

impl ImpulseCounter {
    pub fn new(threshold: u32, target_health: u32) -> Self {
        Self {
            count: 0,
            threshold,
            target_health,
        }
    }

    /// Whether another impulse may still be accepted
    pub fn below_ceiling(&self) -> bool {
        self.count < self.threshold
    }

    /// Count one impulse. Returns true when this impulse reaches the threshold.
    pub fn register(&mut self) -> bool {
        self.count += 1;
        self.target_health = self.target_health.saturating_sub(1);
        self.threshold_reached()
    }

    pub fn threshold_reached(&self) -> bool {
        self.count >= self.threshold
    }

    /// Percentage of the threshold reached (0-100)
    pub fn percent(&self) -> u32 {
        if self.threshold == 0 {
            return 100;
        }
        (self.count.min(self.threshold) * 100) / self.threshold
    }

    pub fn progress_tier(&self) -> ProgressTier {
        match self.percent() {
            0..25 => ProgressTier::Stubborn,
            25..50 => ProgressTier::Wavering,
            50..75 => ProgressTier::Yielding,
            75..100 => ProgressTier::FinalPush,
            _ => ProgressTier::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Select < Phase::Prepare);
        assert!(Phase::Prepare < Phase::Active);
        assert!(Phase::Active < Phase::Resolving);
        assert!(Phase::Resolving < Phase::Finished);
    }

    #[test]
    fn test_participant_fits_variant() {
        let c = Participant::Contestant(Contestant::Female);
        let p = Participant::Practitioner(Practitioner::GrannyLee);
        assert!(c.fits(Variant::Collection));
        assert!(!c.fits(Variant::Impulse));
        assert!(p.fits(Variant::Impulse));
        assert!(!p.fits(Variant::Collection));
    }

    #[test]
    fn test_counter_register_and_tiers() {
        let mut counter = ImpulseCounter::new(4, 3);
        assert_eq!(counter.progress_tier(), ProgressTier::Stubborn);
        assert!(!counter.register());
        assert_eq!(counter.progress_tier(), ProgressTier::Wavering);
        assert!(!counter.register());
        assert!(!counter.register());
        assert_eq!(counter.progress_tier(), ProgressTier::FinalPush);
        assert_eq!(counter.target_health, 0);
        assert!(counter.register());
        assert_eq!(counter.progress_tier(), ProgressTier::Done);
        // Health saturates instead of wrapping
        assert_eq!(counter.target_health, 0);
        assert!(!counter.below_ceiling());
    }
}
