mod engine;
mod random;

pub use engine::{session_weight, RewardEngine, SessionRewards, FULL_BONUS_MINUTES};
pub use random::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
