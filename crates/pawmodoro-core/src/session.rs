//! Post-run bookkeeping.
//!
//! When a run completes the host logs it, re-evaluates cumulative stats for
//! threshold unlocks and grants the companion XP.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collection::{Collection, CumulativeStats};
use crate::error::Result;
use crate::reward::{RandomSource, RewardEngine};
use crate::stats::FocusStats;
use crate::storage::{Database, KvStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub focus_minutes: u32,
    pub cycles: u32,
    pub stats: CumulativeStats,
    pub threshold_unlocks: Vec<String>,
    pub xp_awarded: u32,
    pub companion_level: Option<u32>,
}

/// Record a completed run of `cycles` work phases of `work_minutes` each.
///
/// Streak days are counted in `now`'s time zone.
///
/// # Errors
/// Returns an error if the session log cannot be written or read.
pub fn complete_run<K: KvStore, R: RandomSource, Tz: TimeZone>(
    db: &Database,
    collection: &mut Collection<K>,
    rewards: &mut RewardEngine<R>,
    work_minutes: u32,
    cycles: u32,
    now: DateTime<Tz>,
) -> Result<RunSummary> {
    let focus_minutes = work_minutes.saturating_mul(cycles);
    db.log_session(now.with_timezone(&Utc), focus_minutes, cycles)?;

    let level = collection
        .companion_entry()
        .map(|e| e.progress.level)
        .unwrap_or(1);
    let focus =
        FocusStats::new(db.sessions()?, db.app_open_days()?).with_timezone(now.timezone());
    let stats = focus.cumulative(now.date_naive(), level);

    let threshold_unlocks = rewards.check_threshold_unlocks(collection, &stats);
    let xp_awarded = collection.award_session_xp(work_minutes, cycles);
    let companion_level = collection.companion_entry().map(|e| e.progress.level);

    info!(
        focus_minutes,
        cycles,
        unlocked = threshold_unlocks.len(),
        xp_awarded,
        "run recorded"
    );

    Ok(RunSummary {
        focus_minutes,
        cycles,
        stats,
        threshold_unlocks,
        xp_awarded,
        companion_level,
    })
}
