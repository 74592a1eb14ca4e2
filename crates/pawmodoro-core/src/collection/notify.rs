//! Sequential presentation of unlock notifications.
//!
//! Unlocks can arrive in bursts (a drop plus threshold unlocks). Hosts show
//! them one at a time and hold them back while a break is running.

use std::collections::VecDeque;

use super::catalog::CollectibleDefinition;
use crate::timer::Phase;

#[derive(Debug, Default)]
pub struct UnlockQueue {
    pending: VecDeque<CollectibleDefinition>,
    showing: Option<CollectibleDefinition>,
}

impl UnlockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, def: CollectibleDefinition) {
        self.pending.push_back(def);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn showing(&self) -> Option<&CollectibleDefinition> {
        self.showing.as_ref()
    }

    /// Open the next notification if none is shown and `phase` allows it.
    pub fn present_next(&mut self, phase: Phase) -> Option<&CollectibleDefinition> {
        if self.showing.is_none() && phase != Phase::Break {
            self.showing = self.pending.pop_front();
        }
        self.showing.as_ref()
    }

    /// Close the current notification and open the next one if allowed.
    pub fn dismiss(&mut self, phase: Phase) -> Option<&CollectibleDefinition> {
        self.showing = None;
        self.present_next(phase)
    }

    /// Present and dismiss everything presentable right now, in order.
    pub fn drain_presentable(&mut self, phase: Phase) -> Vec<CollectibleDefinition> {
        let mut out = Vec::new();
        if phase == Phase::Break {
            return out;
        }
        if let Some(current) = self.showing.take() {
            out.push(current);
        }
        out.extend(self.pending.drain(..));
        out
    }
}
