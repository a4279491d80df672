//! Artifact node definitions and their local lock/durability state.

use serde::{Deserialize, Serialize};

use super::{DurabilityComponent, EntityId};
use crate::mechanics::{EffectKey, TriggerKey};

/// A single vertex of an artifact graph.
///
/// A node is created detached and becomes part of exactly one artifact when
/// the graph store attaches it. All state here is local: changing it never
/// touches the graph, so whoever unlocks a node or drains its durability is
/// responsible for asking the owning artifact to rebuild its caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactNode {
    pub id: EntityId,

    /// Resolves to the gameplay effect fired on activation.
    pub effect: EffectKey,

    /// Resolves to the predicate that decides whether a relayed event
    /// triggers this node.
    pub trigger: TriggerKey,

    /// Distance from the graph roots. Presentation only.
    pub depth: u32,

    pub research_value: u32,

    locked: bool,
    durability: DurabilityComponent,
    degraded: bool,

    attached_artifact: Option<EntityId>,

    /// Durability is filled only on the first attachment, so moving a node
    /// between artifacts does not recharge it.
    #[serde(default)]
    ever_attached: bool,
}

impl ArtifactNode {
    /// Create a new locked, detached node.
    pub fn new(effect: impl Into<String>, trigger: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            effect: EffectKey::new(effect),
            trigger: TriggerKey::new(trigger),
            depth: 0,
            research_value: 0,
            locked: true,
            durability: DurabilityComponent::default(),
            degraded: false,
            attached_artifact: None,
            ever_attached: false,
        }
    }

    pub fn with_max_durability(mut self, max: i32) -> Self {
        self.durability = DurabilityComponent::new(max);
        self.refresh_degraded();
        self
    }

    pub fn with_research_value(mut self, value: u32) -> Self {
        self.research_value = value;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// A degraded node has no charge left and refuses activation.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn durability(&self) -> i32 {
        self.durability.current()
    }

    pub fn max_durability(&self) -> i32 {
        self.durability.max()
    }

    pub fn attached_artifact(&self) -> Option<EntityId> {
        self.attached_artifact
    }

    /// Unlock the node. Returns `false` when it was already unlocked.
    ///
    /// There is deliberately no inverse operation.
    pub fn set_unlocked(&mut self) -> bool {
        if !self.locked {
            return false;
        }
        self.locked = false;
        true
    }

    pub fn replenish_durability(&mut self) {
        self.durability.replenish();
        self.refresh_degraded();
    }

    pub fn adjust_durability(&mut self, delta: i32) {
        self.durability.adjust(delta);
        self.refresh_degraded();
    }

    pub fn set_durability(&mut self, value: i32) {
        self.durability.set(value);
        self.refresh_degraded();
    }

    /// Record membership in `artifact`. Called by the graph store only.
    pub fn attach(&mut self, artifact: EntityId) {
        self.attached_artifact = Some(artifact);
        if !self.ever_attached {
            self.ever_attached = true;
            self.replenish_durability();
        }
    }

    /// Clear membership. Called by the graph store only.
    pub fn detach(&mut self) {
        self.attached_artifact = None;
    }

    fn refresh_degraded(&mut self) {
        self.degraded = self.durability.is_depleted();
    }
}
