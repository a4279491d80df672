//! State of an open unlocking window.

use artifact_rules::SimTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Accumulates triggered slots until `end_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockWindow {
    end_time: SimTime,
    triggered: BTreeSet<usize>,
    external_modifier_applied: bool,
}

impl UnlockWindow {
    /// Open a window that closes `duration` after `now`.
    pub fn open(now: SimTime, duration: Duration) -> Self {
        Self {
            end_time: now + duration,
            triggered: BTreeSet::new(),
            external_modifier_applied: false,
        }
    }

    pub fn end_time(&self) -> SimTime {
        self.end_time
    }

    pub fn extend(&mut self, by: Duration) {
        self.end_time += by;
    }

    pub fn is_expired(&self, now: SimTime) -> bool {
        now >= self.end_time
    }

    /// Slots triggered so far, in ascending order.
    pub fn triggered(&self) -> &BTreeSet<usize> {
        &self.triggered
    }

    pub fn has_triggered(&self, index: usize) -> bool {
        self.triggered.contains(&index)
    }

    /// Record a slot. Returns `false` if it was already recorded.
    pub fn record(&mut self, index: usize) -> bool {
        self.triggered.insert(index)
    }

    /// Drop a slot whose node left the artifact. Returns `false` if it was
    /// not recorded.
    pub fn forget(&mut self, index: usize) -> bool {
        self.triggered.remove(&index)
    }

    pub fn external_modifier_applied(&self) -> bool {
        self.external_modifier_applied
    }

    pub fn set_external_modifier(&mut self, applied: bool) {
        self.external_modifier_applied = applied;
    }
}
