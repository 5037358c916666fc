//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Virtual millisecond clock only (the host feeds elapsed time)
//! - Seeded RNG only
//! - Stable iteration order (field order, scheduler registration order)
//! - No rendering, audio or platform dependencies

pub mod agent;
pub mod field;
pub mod input;
pub mod opponent;
pub mod outcome;
pub mod scheduler;
pub mod session;
pub mod state;

pub use agent::{Agent, AgentRole};
pub use field::{Collectible, CollectibleKind, DEFAULT_VALUE_TABLE, ValueEntry};
pub use input::{ImpulseGate, ImpulseSource, InputEvent, InputSender, MotionSample, PlayArea};
pub use opponent::{OpponentDecision, decide};
pub use outcome::{Outcome, resolve};
pub use scheduler::{Scheduler, TaskKind};
pub use session::{RoundSnapshot, Session};
pub use state::{
    Contestant, ImpulseCounter, Participant, Phase, Practitioner, ProgressTier, RoundResult,
    TerminationReason, Variant,
};
