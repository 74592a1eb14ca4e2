use serde::{Deserialize, Serialize};

/// XP needed to leave level 1.
pub const BASE_XP_TO_NEXT_LEVEL: u32 = 100;

/// Companion level progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionProgress {
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
}

impl Default for CompanionProgress {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            xp_to_next_level: BASE_XP_TO_NEXT_LEVEL,
        }
    }
}

impl CompanionProgress {
    /// Add XP, levelling up as many times as it covers. Returns the number of
    /// levels gained.
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.xp_to_next_level > 0 && self.xp >= self.xp_to_next_level {
            self.xp -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = BASE_XP_TO_NEXT_LEVEL.saturating_mul(self.level);
            gained += 1;
        }
        gained
    }
}

/// XP for finishing a run: one point per focused minute.
pub fn session_xp(work_minutes: u32, cycles: u32) -> u32 {
    work_minutes.saturating_mul(cycles)
}
