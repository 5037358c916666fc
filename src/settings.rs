//! Round tuning
//!
//! Loaded from a JSON file; missing fields fall back to the defaults below.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::PICKUP_RADIUS;
use crate::error::SettingsError;
use crate::sim::field::{DEFAULT_VALUE_TABLE, ValueEntry};

/// Largest point total a round may produce (score deltas are `i32`)
pub const MAX_ROUND_POINTS: u64 = i32::MAX as u64;

/// Collectible race tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    /// Pouches laid out per round
    pub item_count: usize,
    pub pickup_radius: f32,
    /// Opponent step length per control step (field units)
    pub opponent_speed: f32,
    /// Opponent control period (200 ms = 5 Hz)
    pub opponent_interval_ms: u64,
    pub prepare_delay_ms: u64,
    /// Pause after the round ends so the last pickup is visible
    pub resolve_delay_ms: u64,
    pub human_start: Vec2,
    pub opponent_start: Vec2,
    pub value_table: Vec<ValueEntry>,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            item_count: 15,
            pickup_radius: PICKUP_RADIUS,
            opponent_speed: 2.0,
            opponent_interval_ms: 200,
            prepare_delay_ms: 0,
            resolve_delay_ms: 500,
            human_start: Vec2::new(50.0, 80.0),
            opponent_start: Vec2::new(30.0, 80.0),
            value_table: DEFAULT_VALUE_TABLE.to_vec(),
        }
    }
}

/// Impulse ritual tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpulseSettings {
    /// Accepted impulses needed to win (also the ceiling)
    pub threshold: u32,
    pub target_health: u32,
    /// Minimum gap between accepted impulses
    pub debounce_ms: u64,
    /// Combined 3-axis delta a motion sample must exceed
    pub shake_threshold: f32,
    /// Paper figure preparation
    pub prepare_delay_ms: u64,
    /// Burn animation after a successful ritual
    pub resolve_delay_ms: u64,
    /// Points sent to the score tally on success
    pub success_bonus: u32,
}

impl Default for ImpulseSettings {
    fn default() -> Self {
        Self {
            threshold: 100,
            target_health: 100,
            debounce_ms: 100,
            shake_threshold: 15.0,
            prepare_delay_ms: 3000,
            resolve_delay_ms: 3000,
            success_bonus: 10,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Countdown length for both variants
    pub round_seconds: u32,
    pub collection: CollectionSettings,
    pub impulse: ImpulseSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            round_seconds: 60,
            collection: CollectionSettings::default(),
            impulse: ImpulseSettings::default(),
        }
    }
}

impl Settings {
    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tuning that would stall or break a round
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid =
            |msg: &str| -> Result<(), SettingsError> { Err(SettingsError::Invalid(msg.to_string())) };

        if self.round_seconds == 0 {
            return invalid("round_seconds must be positive");
        }

        let c = &self.collection;
        if c.item_count == 0 {
            return invalid("collection.item_count must be positive");
        }
        if !(c.pickup_radius > 0.0) {
            return invalid("collection.pickup_radius must be positive");
        }
        if !(c.opponent_speed > 0.0) {
            return invalid("collection.opponent_speed must be positive");
        }
        if c.opponent_interval_ms == 0 {
            return invalid("collection.opponent_interval_ms must be positive");
        }
        if c.value_table.iter().all(|e| e.weight == 0) {
            return invalid("collection.value_table needs at least one weighted entry");
        }
        if c.value_table.iter().any(|e| e.value == 0) {
            return invalid("collection.value_table values must be positive");
        }
        // Every score and tally delta must fit even if one agent takes the whole field
        let max_value = c.value_table.iter().map(|e| u64::from(e.value)).max().unwrap_or(0);
        let field_total = (c.item_count as u64).checked_mul(max_value);
        if field_total.is_none_or(|total| total > MAX_ROUND_POINTS) {
            return invalid("collection.item_count x largest value exceeds the score range");
        }

        let i = &self.impulse;
        if i.threshold == 0 {
            return invalid("impulse.threshold must be positive");
        }
        if i.shake_threshold < 0.0 {
            return invalid("impulse.shake_threshold must not be negative");
        }
        if u64::from(i.success_bonus) > MAX_ROUND_POINTS {
            return invalid("impulse.success_bonus exceeds the score range");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.round_seconds, 60);
        assert_eq!(settings.collection.item_count, 15);
        assert_eq!(settings.impulse.threshold, 100);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings =
            Settings::from_json_str(r#"{ "round_seconds": 30, "impulse": { "threshold": 50 } }"#)
                .unwrap();
        assert_eq!(settings.round_seconds, 30);
        assert_eq!(settings.impulse.threshold, 50);
        assert_eq!(settings.impulse.debounce_ms, 100);
        assert_eq!(settings.collection, CollectionSettings::default());
    }

    #[test]
    fn test_roundtrip_json() {
        let settings = Settings::default();
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = Settings::from_json_str(r#"{ "collection": { "value_table": [] } }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = Settings::from_json_str(r#"{ "round_seconds": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = Settings::from_json_str(
            r#"{ "collection": { "value_table": [
                { "kind": "Fortune", "value": 3000000000, "weight": 1 }
            ] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        // 15 pouches of 200M each would overflow a score
        let err = Settings::from_json_str(
            r#"{ "collection": { "value_table": [
                { "kind": "Scholar", "value": 200000000, "weight": 1 }
            ] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = Settings::from_json_str(r#"{ "impulse": { "success_bonus": 4000000000 } }"#)
            .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = Settings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_huge_weights_accepted() {
        let settings = Settings::from_json_str(
            r#"{ "collection": { "value_table": [
                { "kind": "Fortune", "value": 15, "weight": 4294967295 },
                { "kind": "Safety", "value": 10, "weight": 1 }
            ] } }"#,
        )
        .unwrap();
        assert_eq!(settings.collection.value_table.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/nonexistent/fortune-rounds.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
