//! Error types for round setup, notifications and fortune readings.

use std::io;

use crate::sim::{Phase, Variant};

/// Errors loading or validating [`Settings`](crate::Settings).
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Rejected session commands. None of these are fatal; the session is left untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No participant selected")]
    NoParticipant,

    #[error("Participant does not belong to the {0:?} game")]
    ParticipantMismatch(Variant),

    #[error("Command requires phase {expected:?}, session is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
}

/// Failure reported by a notification sink. Logged and dropped by the session.
#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("Feedback backend unavailable")]
    Unavailable,

    #[error("Feedback backend error: {0}")]
    Backend(String),
}

/// Failures of the text-analysis collaborator.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("Text analysis service unavailable: {0}")]
    Unavailable(String),

    #[error("Empty dream description")]
    EmptyInput,

    #[error("Malformed analysis response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Malformed(err.to_string())
    }
}
