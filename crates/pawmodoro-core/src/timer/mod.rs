mod engine;
mod settings;
mod state;

pub use engine::TimerEngine;
pub use settings::{FixedBreak, NoRewards, SettingsProvider, WorkCompletionHook, MAX_BREAK_MINUTES};
pub use state::{Phase, TimerPhaseState, DEFAULT_WORK_MINUTES};
