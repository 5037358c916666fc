//! Fire-and-forget feedback notifications
//!
//! The session reports what happened (pickups, hits, round start/end, result)
//! through a [`NotificationSink`]. Sinks never block the session and their
//! failures are logged and dropped by the caller.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;
use crate::sim::{AgentRole, Variant};

/// Events a round emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An agent collected a pickup worth `value`
    Pickup { agent: AgentRole, value: u32 },
    /// An impulse landed on the figure
    Hit,
    /// Impulse threshold reached, figure burning
    Burn,
    Win,
    Loss,
    /// Play started (countdown running)
    RoundStart(Variant),
    /// Play stopped (left `Active`)
    RoundEnd,
}

/// Receiver of game events for audio/visual feedback
pub trait NotificationSink {
    fn notify(&mut self, event: &GameEvent) -> Result<(), NotifyError>;
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _event: &GameEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Writes every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, event: &GameEvent) -> Result<(), NotifyError> {
        match event {
            GameEvent::Pickup { .. } | GameEvent::Hit => log::debug!("event: {:?}", event),
            _ => log::info!("event: {:?}", event),
        }
        Ok(())
    }
}

/// Keeps events in a shared buffer a host (or test) can read back
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    /// Take and clear the recorded events
    #[cfg(test)]
    pub fn take(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, event: &GameEvent) -> Result<(), NotifyError> {
        self.events.borrow_mut().push(*event);
        Ok(())
    }
}

/// Sound/animation cues a presentation layer plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackCue {
    /// Chime when the player grabs a pouch
    Collect,
    /// Slipper strike
    Hit,
    /// Crackle while the figure burns
    Burn,
    /// Rising arpeggio on a win
    Success,
    /// Loop background music for the variant
    MusicStart(Variant),
    MusicStop,
}

impl FeedbackCue {
    /// Cue for an event, if any. Opponent pickups and losses are silent.
    pub fn for_event(event: &GameEvent) -> Option<FeedbackCue> {
        match event {
            GameEvent::Pickup {
                agent: AgentRole::Human,
                ..
            } => Some(FeedbackCue::Collect),
            GameEvent::Pickup { .. } => None,
            GameEvent::Hit => Some(FeedbackCue::Hit),
            GameEvent::Burn => Some(FeedbackCue::Burn),
            GameEvent::Win => Some(FeedbackCue::Success),
            GameEvent::Loss => None,
            GameEvent::RoundStart(variant) => Some(FeedbackCue::MusicStart(*variant)),
            GameEvent::RoundEnd => Some(FeedbackCue::MusicStop),
        }
    }
}

/// Adapts a cue player (audio backend) into a notification sink
pub struct CueSink<F>
where
    F: FnMut(FeedbackCue) -> Result<(), NotifyError>,
{
    player: F,
    muted: bool,
}

impl<F> CueSink<F>
where
    F: FnMut(FeedbackCue) -> Result<(), NotifyError>,
{
    pub fn new(player: F) -> Self {
        Self {
            player,
            muted: false,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl<F> NotificationSink for CueSink<F>
where
    F: FnMut(FeedbackCue) -> Result<(), NotifyError>,
{
    fn notify(&mut self, event: &GameEvent) -> Result<(), NotifyError> {
        if self.muted {
            return Ok(());
        }
        match FeedbackCue::for_event(event) {
            Some(cue) => (self.player)(cue),
            None => Ok(()),
        }
    }
}
