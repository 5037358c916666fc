//! Input channel
//!
//! Two channels feed a session:
//! - Continuous pointer/drag, mapped from device coordinates into the
//!   normalized [0, 100] field using the play area's on-screen box
//! - Discrete impulses (tap or shake), debounced and thresholded here
//!
//! Events may be produced from any thread through an [`InputSender`]; the
//! session drains them only at its next processing slot.

use std::sync::mpsc::{self, Receiver, Sender};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::FIELD_MAX;
use crate::clamp_position;

/// On-screen bounding box of the play field, in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Map device coordinates to a clamped field position.
    ///
    /// Returns `None` for a degenerate (zero or negative sized) box.
    pub fn map(&self, client_x: f32, client_y: f32) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let x = (client_x - self.left) / self.width * FIELD_MAX;
        let y = (client_y - self.top) / self.height * FIELD_MAX;
        Some(clamp_position(Vec2::new(x, y)))
    }

    /// Build a pointer event from device coordinates
    pub fn pointer_event(&self, client_x: f32, client_y: f32) -> Option<InputEvent> {
        self.map(client_x, client_y).map(InputEvent::Pointer)
    }
}

/// One 3-axis accelerometer reading (gravity included)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MotionSample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Combined absolute per-axis delta from a previous sample
    pub fn delta(&self, prev: &MotionSample) -> f32 {
        (self.x - prev.x).abs() + (self.y - prev.y).abs() + (self.z - prev.z).abs()
    }
}

/// Where an impulse came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ImpulseSource {
    /// Tap/click on the figure
    Click,
    /// Device motion reading
    Motion(MotionSample),
}

/// A raw input event, queued until the session's next processing slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Continuous pointer position, already normalized to the field
    Pointer(Vec2),
    /// Discrete impulse with its device timestamp in milliseconds
    Impulse { at_ms: u64, source: ImpulseSource },
}

/// Debounce and shake detection for discrete impulses.
///
/// Phase and ceiling checks belong to the session; this only filters jitter.
#[derive(Debug, Clone)]
pub struct ImpulseGate {
    debounce_ms: u64,
    shake_threshold: f32,
    last_accepted_ms: Option<u64>,
    last_sample: MotionSample,
}

impl ImpulseGate {
    pub fn new(debounce_ms: u64, shake_threshold: f32) -> Self {
        Self {
            debounce_ms,
            shake_threshold,
            last_accepted_ms: None,
            last_sample: MotionSample::default(),
        }
    }

    /// Forget timing and motion history (new round)
    pub fn reset(&mut self) {
        self.last_accepted_ms = None;
        self.last_sample = MotionSample::default();
    }

    fn within_debounce(&self, at_ms: u64) -> bool {
        self.last_accepted_ms
            .is_some_and(|last| at_ms.saturating_sub(last) <= self.debounce_ms)
    }

    /// Returns true if the impulse passes debounce (and, for motion, the shake threshold)
    pub fn accept(&mut self, at_ms: u64, source: ImpulseSource) -> bool {
        // Samples inside the debounce window are dropped without updating history
        if self.within_debounce(at_ms) {
            return false;
        }

        let passed = match source {
            ImpulseSource::Click => true,
            ImpulseSource::Motion(sample) => {
                let delta = sample.delta(&self.last_sample);
                self.last_sample = sample;
                delta > self.shake_threshold
            }
        };

        if passed {
            self.last_accepted_ms = Some(at_ms);
        }
        passed
    }
}

/// Cloneable producer half of a session's input queue
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<InputEvent>,
}

impl InputSender {
    /// Queue an event. Returns false if the session is gone.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Single-consumer input queue owned by the session
#[derive(Debug)]
pub struct InputQueue {
    tx: Sender<InputEvent>,
    rx: Receiver<InputEvent>,
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InputQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> InputSender {
        InputSender {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, event: InputEvent) {
        // Receiver lives in self, so this cannot disconnect
        let _ = self.tx.send(event);
    }

    /// Take every event queued so far, in arrival order
    pub fn drain(&self) -> Vec<InputEvent> {
        self.rx.try_iter().collect()
    }
}
