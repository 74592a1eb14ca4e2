use serde::{Deserialize, Serialize};

/// Work length used before the first `start` or `set_work_minutes`.
pub const DEFAULT_WORK_MINUTES: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Work,
    Break,
    /// Terminal until the next `start`.
    Completed,
}

/// Observable state of one timer run.
///
/// Owned by [`super::TimerEngine`]; hosts may serialize it to restore an
/// engine later with [`super::TimerEngine::with_state`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerPhaseState {
    pub minutes_remaining: u32,
    /// Always within `0..=59`.
    pub seconds_remaining: u32,
    pub phase: Phase,
    pub work_length_minutes: u32,
    /// `0` disables the break phase.
    pub break_length_minutes: u32,
    /// `1..=total_cycles` while running, `0` when idle.
    pub current_cycle: u32,
    pub total_cycles: u32,
    pub running: bool,
}

impl TimerPhaseState {
    pub(crate) fn idle(work_length_minutes: u32, break_length_minutes: u32) -> Self {
        Self {
            minutes_remaining: work_length_minutes,
            seconds_remaining: 0,
            phase: Phase::Idle,
            work_length_minutes,
            break_length_minutes,
            current_cycle: 0,
            total_cycles: 1,
            running: false,
        }
    }

    /// Remaining countdown as `(minutes, seconds)`.
    pub fn remaining(&self) -> (u32, u32) {
        (self.minutes_remaining, self.seconds_remaining)
    }

    pub fn remaining_secs(&self) -> u64 {
        u64::from(self.minutes_remaining) * 60 + u64::from(self.seconds_remaining)
    }

    pub fn is_expired(&self) -> bool {
        self.minutes_remaining == 0 && self.seconds_remaining == 0
    }

    /// Minutes of the phase currently on the clock.
    pub fn phase_length_minutes(&self) -> u32 {
        match self.phase {
            Phase::Break => self.break_length_minutes,
            _ => self.work_length_minutes,
        }
    }

    /// `MM:SS`, the way the countdown is displayed.
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.minutes_remaining, self.seconds_remaining
        )
    }

    pub(crate) fn reset_countdown(&mut self, minutes: u32) {
        self.minutes_remaining = minutes;
        self.seconds_remaining = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_state_shows_work_length() {
        let state = TimerPhaseState::idle(25, 5);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.remaining(), (25, 0));
        assert_eq!(state.display(), "25:00");
        assert!(!state.running);
        assert_eq!(state.current_cycle, 0);
    }

    #[test]
    fn remaining_secs_combines_fields() {
        let mut state = TimerPhaseState::idle(2, 0);
        state.seconds_remaining = 30;
        assert_eq!(state.remaining_secs(), 150);
        assert!(!state.is_expired());
        state.reset_countdown(0);
        assert!(state.is_expired());
    }

    #[test]
    fn phase_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Break).unwrap(), "\"break\"");
    }
}
