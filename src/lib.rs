//! Fortune Rounds - timed fortune mini-games
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (field, opponent, input, session)
//! - `feedback`: Fire-and-forget event notifications for audio/visual layers
//! - `tally`: Score tally shared across rounds and fortune readings
//! - `interpret`: Dream-reading collaborator interface and local fallback
//! - `settings`: Data-driven round tuning

pub mod error;
pub mod feedback;
pub mod interpret;
pub mod settings;
pub mod sim;
pub mod tally;

pub use error::{AnalysisError, NotifyError, SessionError, SettingsError};
pub use settings::Settings;
pub use tally::{ScoreSink, ScoreTally};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Play field extent on each axis (positions are percentages)
    pub const FIELD_MIN: f32 = 0.0;
    pub const FIELD_MAX: f32 = 100.0;

    /// Interior spawn rectangle for collectibles (keeps items reachable and visible)
    pub const SPAWN_X_MIN: f32 = 10.0;
    pub const SPAWN_X_MAX: f32 = 90.0;
    pub const SPAWN_Y_MIN: f32 = 10.0;
    pub const SPAWN_Y_MAX: f32 = 70.0;

    /// Countdown period (1 Hz)
    pub const COUNTDOWN_PERIOD_MS: u64 = 1000;

    /// Pickup radius shared by both agents
    pub const PICKUP_RADIUS: f32 = 5.0;
}

/// Euclidean distance in normalized field space
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Clamp a single coordinate to [0, 100]
#[inline]
pub fn clamp_unit(v: f32) -> f32 {
    // NaN would survive f32::clamp, pin it to the field origin instead
    if v.is_nan() {
        return consts::FIELD_MIN;
    }
    v.clamp(consts::FIELD_MIN, consts::FIELD_MAX)
}

/// Clamp a position to the [0, 100] x [0, 100] field
#[inline]
pub fn clamp_position(pos: Vec2) -> Vec2 {
    Vec2::new(clamp_unit(pos.x), clamp_unit(pos.y))
}
