use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::{CollectibleDefinition, Rarity};
use crate::timer::Phase;

/// Every state change in the system produces an Event.
/// Hosts print or forward them; nothing in the core blocks on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        total_cycles: u32,
        work_minutes: u32,
        break_minutes: u32,
        at: DateTime<Utc>,
    },
    TimerStopped {
        /// Cycle that was in progress when the run was abandoned.
        cycle: u32,
        at: DateTime<Utc>,
    },
    /// A work or break phase began after the previous one expired.
    PhaseStarted {
        phase: Phase,
        cycle: u32,
        total_cycles: u32,
        duration_minutes: u32,
        at: DateTime<Utc>,
    },
    RunCompleted {
        total_cycles: u32,
        work_minutes: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        running: bool,
        remaining: String,
        remaining_secs: u64,
        cycle: u32,
        total_cycles: u32,
        work_minutes: u32,
        break_minutes: u32,
        at: DateTime<Utc>,
    },
    CollectibleUnlocked {
        id: String,
        name: String,
        rarity: Rarity,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn collectible_unlocked(def: &CollectibleDefinition) -> Self {
        Event::CollectibleUnlocked {
            id: def.id.clone(),
            name: def.name.clone(),
            rarity: def.rarity,
            at: Utc::now(),
        }
    }

    /// Phase the run is in after this event, where the event implies one.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Event::TimerStarted { .. } => Some(Phase::Work),
            Event::TimerStopped { .. } => Some(Phase::Idle),
            Event::PhaseStarted { phase, .. } | Event::StateSnapshot { phase, .. } => Some(*phase),
            Event::RunCompleted { .. } => Some(Phase::Completed),
            Event::CollectibleUnlocked { .. } => None,
        }
    }
}
