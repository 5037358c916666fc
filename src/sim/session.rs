//! Round session state machine
//!
//! ```text
//! Select --select + confirm--> Prepare --setup delay--> Active
//! Active --time/field/threshold--> Resolving --resolution delay--> Finished
//! Finished --reset--> Select
//! ```
//!
//! [`Session::advance`] is the only place round state changes. Input events
//! queue up from any thread and are applied at the start of the next
//! `advance`; timers (countdown, opponent cadence, phase delays) all run on
//! one scheduler and are cancelled together whenever the round leaves
//! `Active` or is reset.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agent::{Agent, AgentRole};
use super::field::{self, Collectible};
use super::input::{ImpulseGate, ImpulseSource, InputEvent, InputQueue, InputSender};
use super::opponent::{self, OpponentDecision};
use super::outcome::{self, Outcome};
use super::scheduler::{Scheduler, TaskKind};
use super::state::{ImpulseCounter, Participant, Phase, RoundResult, TerminationReason, Variant};
use crate::consts::COUNTDOWN_PERIOD_MS;
use crate::error::SessionError;
use crate::feedback::{GameEvent, NotificationSink, NullSink};
use crate::settings::Settings;
use crate::tally::{ScoreSink, ScoreSource, ScoreTally};

/// Everything a presentation layer (or the resolver) needs about a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub variant: Variant,
    pub phase: Phase,
    pub participant: Option<Participant>,
    pub time_remaining: u32,
    pub human: Agent,
    pub opponent: Agent,
    pub field: Vec<Collectible>,
    pub counter: ImpulseCounter,
    pub termination_reason: Option<TerminationReason>,
    pub result: Option<RoundResult>,
}

/// One player's session for a single mini-game variant
pub struct Session {
    variant: Variant,
    settings: Settings,
    seed: u64,
    rng: Pcg32,
    round: u32,
    phase: Phase,
    participant: Option<Participant>,
    time_remaining: u32,
    human: Agent,
    opponent: Agent,
    field: Vec<Collectible>,
    counter: ImpulseCounter,
    gate: ImpulseGate,
    termination_reason: Option<TerminationReason>,
    result: Option<RoundResult>,
    scheduler: Scheduler,
    inputs: InputQueue,
    notifications: Box<dyn NotificationSink>,
    scores: Box<dyn ScoreSink>,
}

impl Session {
    /// Create a session in `Select`. The seed fixes every round's field layout.
    pub fn new(variant: Variant, settings: Settings, seed: u64) -> Self {
        let human = Agent::new(AgentRole::Human, settings.collection.human_start);
        let opponent = Agent::new(AgentRole::Opponent, settings.collection.opponent_start);
        let counter = ImpulseCounter::new(settings.impulse.threshold, settings.impulse.target_health);
        let gate = ImpulseGate::new(settings.impulse.debounce_ms, settings.impulse.shake_threshold);
        let time_remaining = settings.round_seconds;

        Self {
            variant,
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            round: 0,
            phase: Phase::Select,
            participant: None,
            time_remaining,
            human,
            opponent,
            field: Vec::new(),
            counter,
            gate,
            termination_reason: None,
            result: None,
            scheduler: Scheduler::new(),
            inputs: InputQueue::new(),
            notifications: Box::new(NullSink),
            scores: Box::new(ScoreTally::new()),
        }
    }

    /// Route feedback events to `sink`
    pub fn with_notifications(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notifications = sink;
        self
    }

    /// Route score deltas to `sink`
    pub fn with_scores(mut self, sink: Box<dyn ScoreSink>) -> Self {
        self.scores = sink;
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Rounds started since creation (reset counts a new round)
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn participant(&self) -> Option<Participant> {
        self.participant
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn human(&self) -> &Agent {
        &self.human
    }

    pub fn opponent(&self) -> &Agent {
        &self.opponent
    }

    pub fn field(&self) -> &[Collectible] {
        &self.field
    }

    pub fn counter(&self) -> &ImpulseCounter {
        &self.counter
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.termination_reason
    }

    pub fn result(&self) -> Option<RoundResult> {
        self.result
    }

    /// Session virtual clock in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Handle for queueing input from other threads
    pub fn input_sender(&self) -> InputSender {
        self.inputs.sender()
    }

    /// Queue an input event for the next processing slot
    pub fn push_input(&self, event: InputEvent) {
        self.inputs.push(event);
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            variant: self.variant,
            phase: self.phase,
            participant: self.participant,
            time_remaining: self.time_remaining,
            human: self.human.clone(),
            opponent: self.opponent.clone(),
            field: self.field.clone(),
            counter: self.counter.clone(),
            termination_reason: self.termination_reason,
            result: self.result,
        }
    }

    /// Choose a participant (only while selecting)
    pub fn select(&mut self, participant: Participant) -> Result<(), SessionError> {
        self.expect_phase(Phase::Select)?;
        if !participant.fits(self.variant) {
            return Err(SessionError::ParticipantMismatch(self.variant));
        }
        self.participant = Some(participant);
        Ok(())
    }

    /// Confirm the selection and start preparing the round
    pub fn confirm(&mut self) -> Result<(), SessionError> {
        self.expect_phase(Phase::Select)?;
        if self.participant.is_none() {
            return Err(SessionError::NoParticipant);
        }

        self.set_phase(Phase::Prepare);
        let delay = match self.variant {
            Variant::Collection => self.settings.collection.prepare_delay_ms,
            Variant::Impulse => self.settings.impulse.prepare_delay_ms,
        };
        self.scheduler.after(TaskKind::BeginActive, delay);
        Ok(())
    }

    /// Return a finished round to `Select` with fresh state
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.expect_phase(Phase::Finished)?;

        self.scheduler.cancel_all();
        let stale = self.inputs.drain().len();
        if stale > 0 {
            log::debug!("Dropped {} stale inputs on reset", stale);
        }

        self.participant = None;
        self.termination_reason = None;
        self.result = None;
        self.time_remaining = self.settings.round_seconds;
        self.reset_round_state();
        self.field.clear();
        self.set_phase(Phase::Select);
        Ok(())
    }

    /// Advance the session clock by `dt_ms`.
    ///
    /// Applies queued input first, then fires every timer due in the window
    /// in order.
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.scheduler.now_ms() + dt_ms;

        for event in self.inputs.drain() {
            self.apply_input(event);
        }

        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task);
        }
        self.scheduler.settle(until);
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn set_phase(&mut self, next: Phase) {
        debug_assert!(
            next > self.phase || (self.phase == Phase::Finished && next == Phase::Select),
            "illegal phase transition {:?} -> {:?}",
            self.phase,
            next
        );
        log::info!("{:?} round {}: {:?} -> {:?}", self.variant, self.round, self.phase, next);
        self.phase = next;
    }

    fn emit(&mut self, event: GameEvent) {
        if let Err(err) = self.notifications.notify(&event) {
            log::warn!("Notification {:?} failed: {}", event, err);
        }
    }

    fn reset_round_state(&mut self) {
        let c = &self.settings.collection;
        self.human = Agent::new(AgentRole::Human, c.human_start);
        self.opponent = Agent::new(AgentRole::Opponent, c.opponent_start);
        self.counter = ImpulseCounter::new(
            self.settings.impulse.threshold,
            self.settings.impulse.target_health,
        );
        self.gate.reset();
    }

    fn run_task(&mut self, task: TaskKind) {
        match task {
            TaskKind::BeginActive => self.begin_active(),
            TaskKind::Countdown => self.countdown(),
            TaskKind::OpponentStep => self.opponent_step(),
            TaskKind::Finish => self.finish(),
        }
    }

    fn begin_active(&mut self) {
        if self.phase != Phase::Prepare {
            return;
        }

        self.round += 1;
        self.reset_round_state();
        self.termination_reason = None;
        self.result = None;
        self.time_remaining = self.settings.round_seconds;

        match self.variant {
            Variant::Collection => {
                let c = &self.settings.collection;
                self.field = field::generate(c.item_count, &c.value_table, &mut self.rng);
                self.scheduler.every(TaskKind::OpponentStep, c.opponent_interval_ms);
                log::info!("Laid out {} collectibles", self.field.len());
            }
            Variant::Impulse => {
                self.field.clear();
            }
        }
        self.scheduler.every(TaskKind::Countdown, COUNTDOWN_PERIOD_MS);

        self.set_phase(Phase::Active);
        self.emit(GameEvent::RoundStart(self.variant));
    }

    fn countdown(&mut self) {
        if self.phase != Phase::Active {
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.terminate(TerminationReason::TimeExpired);
        }
    }

    fn opponent_step(&mut self) {
        if self.phase != Phase::Active || self.variant != Variant::Collection {
            return;
        }
        let c = &self.settings.collection;
        let (speed, radius) = (c.opponent_speed, c.pickup_radius);

        match opponent::decide(&self.opponent, &self.field, speed, radius) {
            OpponentDecision::Idle => {}
            OpponentDecision::Move { to } => self.opponent.set_position(to),
            OpponentDecision::Collect { target } => {
                log::trace!("Opponent reaching for pickup {}", target);
                self.collect_at(AgentRole::Opponent);
            }
        }
    }

    fn apply_input(&mut self, event: InputEvent) {
        if self.phase != Phase::Active {
            log::trace!("Discarding {:?} outside Active", event);
            return;
        }

        match (self.variant, event) {
            (Variant::Collection, InputEvent::Pointer(pos)) => self.move_human(pos),
            (Variant::Impulse, InputEvent::Impulse { at_ms, source }) => {
                self.apply_impulse(at_ms, source)
            }
            _ => log::trace!("Ignoring {:?} for {:?}", event, self.variant),
        }
    }

    fn move_human(&mut self, pos: Vec2) {
        self.human.set_position(pos);
        // One drag can sweep over several pouches
        while self.phase == Phase::Active && self.collect_at(AgentRole::Human) {}
    }

    /// Check-and-flip one pickup for `role` at its current position.
    ///
    /// Score credit happens in the same step as the flip. Returns whether
    /// anything was collected.
    fn collect_at(&mut self, role: AgentRole) -> bool {
        let radius = self.settings.collection.pickup_radius;
        let pos = match role {
            AgentRole::Human => self.human.pos,
            AgentRole::Opponent => self.opponent.pos,
        };
        let Some(item) = field::try_collect(&mut self.field, pos, radius) else {
            return false;
        };

        match role {
            AgentRole::Human => {
                self.human.credit(item.value);
                self.scores.on_score_delta(score_delta(item.value), ScoreSource::Pickup);
            }
            AgentRole::Opponent => self.opponent.credit(item.value),
        }
        log::debug!(
            "{:?} collected {} ({}) at {:?}, {} left",
            role,
            item.kind.label(),
            item.value,
            item.pos,
            field::remaining(&self.field)
        );
        self.emit(GameEvent::Pickup {
            agent: role,
            value: item.value,
        });

        if field::all_collected(&self.field) {
            self.terminate(TerminationReason::FieldExhausted);
        }
        true
    }

    fn apply_impulse(&mut self, at_ms: u64, source: ImpulseSource) {
        if !self.counter.below_ceiling() {
            return;
        }
        if !self.gate.accept(at_ms, source) {
            log::trace!("Impulse at {}ms rejected", at_ms);
            return;
        }

        let reached = self.counter.register();
        log::debug!(
            "Impulse {}/{} (health {})",
            self.counter.count,
            self.counter.threshold,
            self.counter.target_health
        );
        self.emit(GameEvent::Hit);

        if reached {
            self.terminate(TerminationReason::ImpulseThresholdReached);
        }
    }

    fn terminate(&mut self, reason: TerminationReason) {
        if self.phase != Phase::Active {
            return;
        }

        self.scheduler.cancel_all();
        self.termination_reason = Some(reason);
        self.set_phase(Phase::Resolving);
        log::info!(
            "Round ended: {:?} with {}s left (human {}, opponent {}, impulses {})",
            reason,
            self.time_remaining,
            self.human.score,
            self.opponent.score,
            self.counter.count
        );
        self.emit(GameEvent::RoundEnd);

        let delay = match (self.variant, reason) {
            (Variant::Collection, _) => self.settings.collection.resolve_delay_ms,
            (Variant::Impulse, TerminationReason::ImpulseThresholdReached) => {
                self.emit(GameEvent::Burn);
                self.settings.impulse.resolve_delay_ms
            }
            // Nothing to burn after a failed ritual
            (Variant::Impulse, _) => 0,
        };
        self.scheduler.after(TaskKind::Finish, delay);
    }

    fn finish(&mut self) {
        if self.phase != Phase::Resolving {
            return;
        }

        let Some(Outcome { result, reason }) = outcome::resolve(&self.snapshot()) else {
            log::warn!("Resolving without a termination reason");
            return;
        };
        self.result = Some(result);
        self.set_phase(Phase::Finished);
        log::info!("{:?} round {} result: {:?} ({:?})", self.variant, self.round, result, reason);

        match result {
            RoundResult::Win => {
                self.emit(GameEvent::Win);
                if self.variant == Variant::Impulse {
                    let bonus = score_delta(self.settings.impulse.success_bonus);
                    self.scores.on_score_delta(bonus, ScoreSource::ImpulseBonus);
                }
            }
            RoundResult::Lose => self.emit(GameEvent::Loss),
        }
    }
}

/// Points as a tally delta, saturating at `i32::MAX`
fn score_delta(points: u32) -> i32 {
    i32::try_from(points).unwrap_or_else(|_| {
        log::warn!("Score delta {} out of range, capped at {}", points, i32::MAX);
        i32::MAX
    })
}
