//! # Pawmodoro Core Library
//!
//! This library provides the core logic for Pawmodoro, a Pomodoro timer that
//! rewards finished work phases with collectible pets. All operations are
//! available through the `pawmodoro` CLI binary, which is a thin layer over
//! this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A per-second countdown state machine cycling work and
//!   break phases; the caller invokes `tick()` once per second
//! - **Rewards**: Weighted drop rolls after each work phase and threshold
//!   unlocks from cumulative stats, with an injectable random source
//! - **Collection**: Unlocked pets, the companion and its level progress,
//!   persisted through a key-value store
//! - **Storage**: SQLite session/kv storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`RewardEngine`]: Drop rolls and threshold unlocks
//! - [`Collection`]: Unlocked collectibles and companion selection
//! - [`Database`]: Session log and key-value persistence
//! - [`Config`]: Application configuration management

pub mod collection;
pub mod error;
pub mod events;
pub mod reward;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use collection::{
    Catalog, CollectibleDefinition, Collection, CollectionEntry, CollectionStore,
    CompanionProgress, CumulativeStats, Rarity, UnlockCondition, UnlockKind, UnlockQueue,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use reward::{RandomSource, RewardEngine, SeededRandom, SessionRewards, ThreadRandom};
pub use session::{complete_run, RunSummary};
pub use stats::{DailyFocus, FocusStats, StatsSummary};
pub use storage::{Config, Database, KvStore, MemoryKv};
pub use timer::{
    FixedBreak, NoRewards, Phase, SettingsProvider, TimerEngine, TimerPhaseState,
    WorkCompletionHook,
};
