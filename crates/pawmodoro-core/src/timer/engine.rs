//! Phase-cycling timer engine.
//!
//! The engine counts down in whole seconds. It does not use internal
//! threads - the caller is responsible for calling `tick()` once per
//! elapsed second.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Work -> Break -> Work -> ... -> Completed
//!           \______________/  (break skipped when its length is 0)
//! ```
//!
//! When a break is configured it follows every work phase, including the
//! last; the run completes when that trailing break expires. With a zero
//! break the run completes as soon as the last work phase expires.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(FixedBreak(5), NoRewards);
//! engine.start(4, 25);
//! // Once per second:
//! if let Some(event) = engine.tick() { /* phase changed */ }
//! ```

use chrono::Utc;
use tracing::{debug, info, warn};

use super::settings::{SettingsProvider, WorkCompletionHook};
use super::state::{Phase, TimerPhaseState, DEFAULT_WORK_MINUTES};
use crate::events::Event;

/// Core timer engine.
///
/// `S` supplies the break length, `H` is told about every expired work
/// phase (the reward path).
#[derive(Debug)]
pub struct TimerEngine<S, H> {
    settings: S,
    hook: H,
    state: TimerPhaseState,
    /// Work length requested mid-run, applied once the run ends.
    pending_work_minutes: Option<u32>,
}

impl<S: SettingsProvider, H: WorkCompletionHook> TimerEngine<S, H> {
    /// Create an idle engine showing the default work length.
    pub fn new(settings: S, hook: H) -> Self {
        let state = TimerPhaseState::idle(DEFAULT_WORK_MINUTES, settings.break_length_minutes());
        Self {
            settings,
            hook,
            state,
            pending_work_minutes: None,
        }
    }

    /// Rebuild an engine around a previously observed state.
    pub fn with_state(settings: S, hook: H, state: TimerPhaseState) -> Self {
        Self {
            settings,
            hook,
            state,
            pending_work_minutes: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerPhaseState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Work length queued by `set_work_minutes` during the current run.
    pub fn pending_work_minutes(&self) -> Option<u32> {
        self.pending_work_minutes
    }

    pub fn current_cycle(&self) -> u32 {
        self.state.current_cycle
    }

    pub fn remaining(&self) -> (u32, u32) {
        self.state.remaining()
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    pub fn into_parts(self) -> (S, H, TimerPhaseState) {
        (self.settings, self.hook, self.state)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let s = &self.state;
        Event::StateSnapshot {
            phase: s.phase,
            running: s.running,
            remaining: s.display(),
            remaining_secs: s.remaining_secs(),
            cycle: s.current_cycle,
            total_cycles: s.total_cycles,
            work_minutes: s.work_length_minutes,
            break_minutes: s.break_length_minutes,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run of `total_cycles` work phases of `work_minutes` each.
    ///
    /// `total_cycles` below 1 is clamped to 1. A live run is stopped first.
    pub fn start(&mut self, total_cycles: u32, work_minutes: u32) -> Event {
        if self.state.running {
            warn!(
                cycle = self.state.current_cycle,
                "start requested while running; stopping current run first"
            );
            self.stop();
        }

        self.pending_work_minutes = None;
        let total_cycles = total_cycles.max(1);
        let break_minutes = self.settings.break_length_minutes();
        self.state = TimerPhaseState {
            minutes_remaining: work_minutes,
            seconds_remaining: 0,
            phase: Phase::Work,
            work_length_minutes: work_minutes,
            break_length_minutes: break_minutes,
            current_cycle: 1,
            total_cycles,
            running: true,
        };
        info!(total_cycles, work_minutes, break_minutes, "timer run started");

        Event::TimerStarted {
            total_cycles,
            work_minutes,
            break_minutes,
            at: Utc::now(),
        }
    }

    /// Abandon the run and return to `Idle`. No-op when already idle.
    pub fn stop(&mut self) -> Option<Event> {
        if self.state.phase == Phase::Idle {
            return None;
        }
        let cycle = self.state.current_cycle;
        self.apply_pending_work_minutes();
        let work = self.state.work_length_minutes;
        self.state.running = false;
        self.state.phase = Phase::Idle;
        self.state.current_cycle = 0;
        self.state.reset_countdown(work);
        info!(cycle, "timer run stopped");
        Some(Event::TimerStopped {
            cycle,
            at: Utc::now(),
        })
    }

    /// Change the work length. While a run is live the value is only queued:
    /// the run keeps its start-time length and the new one applies from the
    /// next run.
    pub fn set_work_minutes(&mut self, minutes: u32) {
        if self.state.running {
            debug!(minutes, "work length queued until the run ends");
            self.pending_work_minutes = Some(minutes);
            return;
        }
        self.state.work_length_minutes = minutes;
        self.state.reset_countdown(minutes);
    }

    /// Re-read the break length, e.g. when the host window regains focus.
    pub fn reload_settings(&mut self) {
        let break_minutes = self.settings.break_length_minutes();
        if break_minutes != self.state.break_length_minutes {
            debug!(
                from = self.state.break_length_minutes,
                to = break_minutes,
                "break length reloaded"
            );
        }
        self.state.break_length_minutes = break_minutes;
    }

    /// Advance by one second. Returns an event when a phase expired.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }

        let s = &mut self.state;
        if s.seconds_remaining > 0 {
            s.seconds_remaining -= 1;
            return None;
        }
        if s.minutes_remaining > 0 {
            s.minutes_remaining -= 1;
            s.seconds_remaining = 59;
            return None;
        }

        Some(self.expire_phase())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expire_phase(&mut self) -> Event {
        match self.state.phase {
            Phase::Work => {
                let work = self.state.work_length_minutes;
                debug!(cycle = self.state.current_cycle, work, "work phase expired");
                self.hook.work_completed(work);

                if self.state.break_length_minutes == 0 {
                    self.next_cycle_or_complete()
                } else {
                    let minutes = self.state.break_length_minutes;
                    self.state.phase = Phase::Break;
                    self.state.reset_countdown(minutes);
                    self.phase_started(Phase::Break, minutes)
                }
            }
            Phase::Break => {
                debug!(cycle = self.state.current_cycle, "break phase expired");
                self.next_cycle_or_complete()
            }
            // `running` is never true in these phases.
            Phase::Idle | Phase::Completed => {
                self.state.running = false;
                self.snapshot()
            }
        }
    }

    fn apply_pending_work_minutes(&mut self) {
        if let Some(minutes) = self.pending_work_minutes.take() {
            self.state.work_length_minutes = minutes;
        }
    }

    fn next_cycle_or_complete(&mut self) -> Event {
        let work = self.state.work_length_minutes;
        if self.state.current_cycle >= self.state.total_cycles {
            self.state.running = false;
            self.state.phase = Phase::Completed;
            self.apply_pending_work_minutes();
            let next = self.state.work_length_minutes;
            self.state.reset_countdown(next);
            info!(total_cycles = self.state.total_cycles, "timer run completed");
            return Event::RunCompleted {
                total_cycles: self.state.total_cycles,
                work_minutes: work,
                at: Utc::now(),
            };
        }

        self.state.current_cycle += 1;
        self.state.phase = Phase::Work;
        self.state.reset_countdown(work);
        self.phase_started(Phase::Work, work)
    }

    fn phase_started(&self, phase: Phase, duration_minutes: u32) -> Event {
        debug!(?phase, cycle = self.state.current_cycle, duration_minutes, "phase started");
        Event::PhaseStarted {
            phase,
            cycle: self.state.current_cycle,
            total_cycles: self.state.total_cycles,
            duration_minutes,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{FixedBreak, NoRewards};
    use std::cell::Cell;

    fn engine(break_minutes: u32) -> TimerEngine<FixedBreak, NoRewards> {
        TimerEngine::new(FixedBreak(break_minutes), NoRewards)
    }

    #[test]
    fn new_engine_is_idle() {
        let engine = engine(5);
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(!engine.is_running());
        assert_eq!(engine.current_cycle(), 0);
        assert_eq!(engine.remaining(), (DEFAULT_WORK_MINUTES, 0));
    }

    #[test]
    fn start_enters_first_work_phase() {
        let mut engine = engine(5);
        let event = engine.start(3, 10);
        assert!(matches!(event, Event::TimerStarted { total_cycles: 3, .. }));
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.current_cycle(), 1);
        assert_eq!(engine.remaining(), (10, 0));
        assert_eq!(engine.state().break_length_minutes, 5);
        assert!(engine.is_running());
    }

    #[test]
    fn start_clamps_zero_cycles() {
        let mut engine = engine(5);
        engine.start(0, 10);
        assert_eq!(engine.state().total_cycles, 1);
    }

    #[test]
    fn tick_decrements_then_borrows_minute() {
        let mut engine = engine(5);
        engine.start(1, 2);
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining(), (1, 59));
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining(), (1, 58));
    }

    #[test]
    fn tick_is_noop_when_idle() {
        let mut engine = engine(5);
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining(), (DEFAULT_WORK_MINUTES, 0));
    }

    #[test]
    fn stop_resets_to_last_work_length() {
        let mut engine = engine(5);
        engine.start(2, 10);
        engine.tick();
        assert!(engine.stop().is_some());
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.current_cycle(), 0);
        assert_eq!(engine.remaining(), (10, 0));
        assert!(engine.stop().is_none());
    }

    #[test]
    fn set_work_minutes_updates_display_only_when_idle() {
        let mut engine = engine(5);
        engine.set_work_minutes(40);
        assert_eq!(engine.remaining(), (40, 0));

        engine.start(1, 10);
        engine.set_work_minutes(50);
        assert_eq!(engine.remaining(), (10, 0));
        assert_eq!(engine.state().work_length_minutes, 10);
        assert_eq!(engine.pending_work_minutes(), Some(50));

        engine.stop();
        assert_eq!(engine.pending_work_minutes(), None);
        assert_eq!(engine.state().work_length_minutes, 50);
        assert_eq!(engine.remaining(), (50, 0));
    }

    #[test]
    fn queued_work_length_applies_on_completion() {
        let mut engine = engine(0);
        engine.start(1, 0);
        engine.set_work_minutes(45);
        match engine.tick() {
            Some(Event::RunCompleted { work_minutes, .. }) => assert_eq!(work_minutes, 0),
            other => panic!("expected RunCompleted, got {other:?}"),
        }
        assert_eq!(engine.state().work_length_minutes, 45);
        assert_eq!(engine.remaining(), (45, 0));
    }

    #[test]
    fn start_discards_queued_work_length() {
        let mut engine = engine(5);
        engine.start(1, 10);
        engine.set_work_minutes(50);
        engine.start(1, 20);
        assert_eq!(engine.pending_work_minutes(), None);
        engine.stop();
        assert_eq!(engine.remaining(), (20, 0));
    }

    #[test]
    fn zero_minute_work_expires_on_first_tick() {
        let calls = Cell::new(0);
        let mut engine = TimerEngine::new(FixedBreak(0), |_: u32| calls.set(calls.get() + 1));
        engine.start(1, 0);
        let event = engine.tick();
        assert!(matches!(event, Some(Event::RunCompleted { .. })));
        assert_eq!(engine.phase(), Phase::Completed);
        assert!(!engine.is_running());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn hook_receives_work_length() {
        let seen = Cell::new(None);
        let mut engine = TimerEngine::new(FixedBreak(1), |m: u32| seen.set(Some(m)));
        engine.start(1, 0);
        engine.tick();
        assert_eq!(seen.get(), Some(0));
        assert_eq!(engine.phase(), Phase::Break);
    }

    #[test]
    fn start_while_running_restarts_cleanly() {
        let mut engine = engine(5);
        engine.start(3, 10);
        engine.tick();
        engine.start(2, 20);
        assert_eq!(engine.current_cycle(), 1);
        assert_eq!(engine.remaining(), (20, 0));
        assert_eq!(engine.state().total_cycles, 2);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = engine(5);
        match engine.snapshot() {
            Event::StateSnapshot {
                phase,
                remaining,
                remaining_secs,
                ..
            } => {
                assert_eq!(phase, Phase::Idle);
                assert_eq!(remaining, "25:00");
                assert_eq!(remaining_secs, 25 * 60);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
