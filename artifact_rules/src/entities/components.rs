//! Component definitions for artifact nodes.

use serde::{Deserialize, Serialize};

/// Consumable charge of a node. Every write keeps `current` inside `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurabilityComponent {
    current: i32,
    max: i32,
}

impl Default for DurabilityComponent {
    fn default() -> Self {
        Self::new(3)
    }
}

impl DurabilityComponent {
    /// Create a full durability pool. A negative `max` is treated as zero.
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Reset to full charge.
    pub fn replenish(&mut self) {
        self.current = self.max;
    }

    /// Add `delta` (which may be negative), clamped to `[0, max]`.
    pub fn adjust(&mut self, delta: i32) {
        self.set(self.current.saturating_add(delta));
    }

    /// Overwrite the charge, clamped to `[0, max]`.
    pub fn set(&mut self, value: i32) {
        self.current = value.clamp(0, self.max);
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }
}
