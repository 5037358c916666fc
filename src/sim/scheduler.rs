//! Virtual-clock task scheduler
//!
//! One clock drives every timer a round needs: the 1 Hz countdown, the faster
//! opponent cadence and the one-shot phase delays. Tasks are popped one at a
//! time in due order so a task that cancels the others (phase exit) takes
//! effect before anything else fires.

use serde::{Deserialize, Serialize};

/// Timers a session registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Decrement the countdown
    Countdown,
    /// Run the opponent controller
    OpponentStep,
    /// Prepare delay elapsed
    BeginActive,
    /// Resolution delay elapsed
    Finish,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Task {
    kind: TaskKind,
    due_ms: u64,
    /// `None` for one-shot tasks
    period_ms: Option<u64>,
    /// Registration order, breaks ties between tasks due at the same instant
    seq: u64,
}

/// Scheduler of periodic and one-shot tasks on a millisecond virtual clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now_ms: u64,
    tasks: Vec<Task>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Register a task firing every `period_ms`, first after one full period
    pub fn every(&mut self, kind: TaskKind, period_ms: u64) {
        let period_ms = period_ms.max(1);
        self.push(kind, self.now_ms + period_ms, Some(period_ms));
    }

    /// Register a task firing once after `delay_ms`
    pub fn after(&mut self, kind: TaskKind, delay_ms: u64) {
        self.push(kind, self.now_ms + delay_ms, None);
    }

    fn push(&mut self, kind: TaskKind, due_ms: u64, period_ms: Option<u64>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Task {
            kind,
            due_ms,
            period_ms,
            seq,
        });
    }

    /// Cancel every outstanding task
    pub fn cancel_all(&mut self) {
        if !self.tasks.is_empty() {
            log::debug!("Cancelling {} scheduled tasks", self.tasks.len());
        }
        self.tasks.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    #[cfg(test)]
    pub fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|t| t.kind == kind)
    }

    /// Pop the earliest task due at or before `until_ms`, advancing the clock to it.
    ///
    /// Periodic tasks are re-armed one period later. Returns `None` once
    /// nothing else is due; the clock is left at its last fired instant.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TaskKind> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.seq))
            .map(|(i, _)| i)?;

        let Task {
            kind,
            due_ms,
            period_ms,
            ..
        } = self.tasks[idx];
        self.now_ms = self.now_ms.max(due_ms);
        match period_ms {
            Some(period) => self.tasks[idx].due_ms += period,
            None => {
                self.tasks.swap_remove(idx);
            }
        }
        Some(kind)
    }

    /// Move the clock forward to `until_ms` once nothing else is due
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
