//! Drop rolls and threshold unlocks.
//!
//! Two unlock paths share one collection:
//! - [`RewardEngine::roll_drop`] runs after every work phase and picks at
//!   most one locked collectible by weighted roulette, scaled by how long
//!   the phase was.
//! - [`RewardEngine::check_threshold_unlocks`] runs on cumulative stats and
//!   gives every locked collectible whose condition holds an independent
//!   chance equal to its drop weight.
//!
//! The store's `unlock` is idempotent, so neither path can double-unlock.

use std::sync::Arc;

use tracing::debug;

use super::random::RandomSource;
use crate::collection::{Catalog, CollectionStore, CumulativeStats};
use crate::timer::WorkCompletionHook;

/// Sessions of this length or longer roll at full drop weight.
pub const FULL_BONUS_MINUTES: f64 = 60.0;

/// Scale a base drop weight by session length: half weight at 0 minutes,
/// rising linearly to full weight at 60 minutes and beyond.
pub fn session_weight(drop_weight: f64, work_minutes: u32) -> f64 {
    let ratio = (f64::from(work_minutes) / FULL_BONUS_MINUTES).min(1.0);
    drop_weight * (0.5 + 0.5 * ratio)
}

#[derive(Debug, Clone)]
pub struct RewardEngine<R> {
    catalog: Arc<Catalog>,
    rng: R,
}

impl<R: RandomSource> RewardEngine<R> {
    pub fn new(catalog: Arc<Catalog>, rng: R) -> Self {
        Self { catalog, rng }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Roll for one drop after a work phase of `work_minutes`.
    ///
    /// Returns the unlocked id, or `None` when everything is unlocked or no
    /// candidate carries weight.
    pub fn roll_drop(
        &mut self,
        store: &mut impl CollectionStore,
        work_minutes: u32,
    ) -> Option<String> {
        let candidates: Vec<(&str, f64)> = self
            .catalog
            .entries()
            .iter()
            .filter(|d| !store.is_unlocked(&d.id))
            .map(|d| (d.id.as_str(), session_weight(d.drop_weight, work_minutes)))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let total: f64 = candidates.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return None;
        }

        let mut remainder = self.rng.next_f64() * total;
        // Rounding can leave a sliver after the last candidate.
        let mut picked = candidates[candidates.len() - 1].0;
        for &(id, weight) in &candidates {
            remainder -= weight;
            if remainder <= 0.0 {
                picked = id;
                break;
            }
        }

        debug!(id = picked, work_minutes, total_weight = total, "drop rolled");
        let picked = picked.to_string();
        store.unlock(&picked);
        Some(picked)
    }

    /// Give every locked collectible whose condition `stats` meets an
    /// independent `drop_weight` chance. Returns unlocked ids in catalog
    /// order.
    pub fn check_threshold_unlocks(
        &mut self,
        store: &mut impl CollectionStore,
        stats: &CumulativeStats,
    ) -> Vec<String> {
        let mut unlocked = Vec::new();
        for def in self.catalog.entries() {
            if store.is_unlocked(&def.id) || !def.unlock_condition.is_met(stats) {
                continue;
            }
            if self.rng.next_f64() < def.drop_weight && store.unlock(&def.id) {
                unlocked.push(def.id.clone());
            }
        }
        unlocked
    }
}

/// A collection plus a reward engine: the engine's work-completion hook.
#[derive(Debug)]
pub struct SessionRewards<C, R> {
    pub store: C,
    pub rewards: RewardEngine<R>,
    last_drop: Option<String>,
}

impl<C: CollectionStore, R: RandomSource> SessionRewards<C, R> {
    pub fn new(store: C, rewards: RewardEngine<R>) -> Self {
        Self {
            store,
            rewards,
            last_drop: None,
        }
    }

    /// Id unlocked by the most recent work phase, if it dropped anything.
    pub fn last_drop(&self) -> Option<&str> {
        self.last_drop.as_deref()
    }

    pub fn check_threshold_unlocks(&mut self, stats: &CumulativeStats) -> Vec<String> {
        self.rewards.check_threshold_unlocks(&mut self.store, stats)
    }

    pub fn into_inner(self) -> (C, RewardEngine<R>) {
        (self.store, self.rewards)
    }
}

impl<C: CollectionStore, R: RandomSource> WorkCompletionHook for SessionRewards<C, R> {
    fn work_completed(&mut self, work_minutes: u32) {
        self.last_drop = self.rewards.roll_drop(&mut self.store, work_minutes);
    }
}
