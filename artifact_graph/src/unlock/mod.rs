//! Unlock/trigger coordinator - the timed unlocking state machine and the
//! direct activation entry points.
//!
//! An artifact is either idle or has one open [`UnlockWindow`]:
//! 1. **Trigger**: the first trigger opens a window of `unlock.window_ms`
//! 2. **Accumulate**: further triggers record their slot; a trigger that lies
//!    on the same predecessor/successor chain as everything recorded so far
//!    extends the window by `unlock.extension_ms`
//! 3. **Resolve**: once the window has expired, [`ArtifactSystem::update`]
//!    (or the next [`ArtifactSystem::trigger`]) unlocks the node whose
//!    prerequisites match the recorded slots, if any
//! 4. **Refractory**: non-forced triggers are ignored for `unlock.refractory_ms`
//!
//! A structural edit made with `dirty = true` cancels the window outright.

mod window;

pub use window::*;

use artifact_rules::{ArtifactConfig, ArtifactNode, EntityId, SimTime};

use crate::error::{ArtifactError, ArtifactResult};
use crate::events::{
    ActivationRequest, EffectRegistry, Feedback, FeedbackSink, NodeActivated, RelayedEvent,
    TracingFeedbackSink, TriggerRegistry, WorldEvent,
};
use crate::graph::Artifact;

/// What a call to [`ArtifactSystem::trigger`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Inside the refractory period; nothing happened.
    Ignored,
    /// A new window was opened.
    Opened,
    /// The window was extended.
    Extended,
    /// The trigger was recorded (or was a repeat) without extending.
    Recorded,
}

/// Result of resolving an expired window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockResolution {
    /// Slot of the node that was unlocked, if any matched.
    pub unlocked: Option<usize>,
}

/// Drives the unlocking state machine and node activation for any number of
/// artifacts. Artifacts are passed in per call; the system only owns
/// configuration, the host-supplied registries and pending feedback.
///
/// Feedback goes to the [`FeedbackSink`] as it is produced and is also kept
/// until [`ArtifactSystem::drain_feedback`].
pub struct ArtifactSystem {
    config: ArtifactConfig,
    effects: EffectRegistry,
    triggers: TriggerRegistry,
    sink: Box<dyn FeedbackSink>,
    feedback: Vec<Feedback>,
}

impl Default for ArtifactSystem {
    fn default() -> Self {
        Self::new(ArtifactConfig::default())
    }
}

impl std::fmt::Debug for ArtifactSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactSystem")
            .field("config", &self.config)
            .field("effects", &self.effects)
            .field("triggers", &self.triggers)
            .field("feedback", &self.feedback)
            .finish_non_exhaustive()
    }
}

impl ArtifactSystem {
    pub fn new(config: ArtifactConfig) -> Self {
        Self {
            config,
            effects: EffectRegistry::new(),
            triggers: TriggerRegistry::new(),
            sink: Box::new(TracingFeedbackSink),
            feedback: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Replace the default [`TracingFeedbackSink`].
    pub fn set_feedback_sink(&mut self, sink: impl FeedbackSink + 'static) {
        self.sink = Box::new(sink);
    }

    pub fn config(&self) -> &ArtifactConfig {
        &self.config
    }

    pub fn effects_mut(&mut self) -> &mut EffectRegistry {
        &mut self.effects
    }

    pub fn triggers_mut(&mut self) -> &mut TriggerRegistry {
        &mut self.triggers
    }

    /// Take every feedback message produced since the last drain.
    pub fn drain_feedback(&mut self) -> Vec<Feedback> {
        std::mem::take(&mut self.feedback)
    }

    fn push_feedback(&mut self, feedback: Feedback) {
        self.sink.deliver(&feedback);
        self.feedback.push(feedback);
    }

    /// A detached node using the configured default durability.
    pub fn create_node(&self, effect: impl Into<String>, trigger: impl Into<String>) -> ArtifactNode {
        ArtifactNode::new(effect, trigger).with_max_durability(self.config.node.default_max_durability)
    }

    /// Register a trigger, opening or extending the unlocking window.
    ///
    /// A window that has already expired is resolved first, so the trigger
    /// then falls into the refractory period. With `force`, the refractory
    /// period is skipped.
    pub fn trigger(
        &mut self,
        artifact: &mut Artifact,
        node: Option<EntityId>,
        now: SimTime,
        force: bool,
    ) -> ArtifactResult<TriggerOutcome> {
        if artifact.unlocking().is_some_and(|w| w.is_expired(now)) {
            self.finish_unlocking(artifact, now);
        }
        if !force && now < artifact.next_unlock_time {
            return Ok(TriggerOutcome::Ignored);
        }
        let index = node.map(|id| artifact.index_of(id)).transpose()?;

        let Some(window) = artifact.unlocking() else {
            let mut window = UnlockWindow::open(now, self.config.unlock.window());
            if let Some(index) = index {
                window.record(index);
            }
            tracing::debug!(
                artifact = %artifact.id,
                end_time = %window.end_time(),
                "unlocking window opened"
            );
            artifact.set_unlocking(window);
            return Ok(TriggerOutcome::Opened);
        };

        let Some(index) = index else {
            return Ok(TriggerOutcome::Recorded);
        };
        if window.has_triggered(index) {
            return Ok(TriggerOutcome::Recorded);
        }

        let consistent = {
            let predecessors = artifact.predecessors(index)?;
            let successors = artifact.successors(index)?;
            window
                .triggered()
                .iter()
                .all(|i| predecessors.contains(i) || successors.contains(i))
        };

        let extension = self.config.unlock.extension();
        let Some(window) = artifact.unlocking_mut() else {
            return Ok(TriggerOutcome::Recorded);
        };
        window.record(index);
        if consistent {
            window.extend(extension);
            tracing::debug!(index, end_time = %window.end_time(), "unlocking window extended");
            Ok(TriggerOutcome::Extended)
        } else {
            Ok(TriggerOutcome::Recorded)
        }
    }

    /// Toggle the external modifier on the open window. Returns `false` if
    /// no window is open.
    pub fn set_external_modifier(&self, artifact: &mut Artifact, applied: bool) -> bool {
        match artifact.unlocking_mut() {
            Some(window) => {
                window.set_external_modifier(applied);
                true
            }
            None => false,
        }
    }

    /// Per-tick update: resolve the window once it has expired.
    pub fn update(&mut self, artifact: &mut Artifact, now: SimTime) -> Option<UnlockResolution> {
        if !artifact.unlocking().is_some_and(|w| w.is_expired(now)) {
            return None;
        }
        Some(self.finish_unlocking(artifact, now))
    }

    /// Unlock the first recorded node whose prerequisites the recorded slots
    /// satisfy, then clear the window and start the refractory period.
    ///
    /// Always closes the window with feedback, whatever the recorded slots hold.
    fn finish_unlocking(&mut self, artifact: &mut Artifact, now: SimTime) -> UnlockResolution {
        let Some(window) = artifact.take_unlocking() else {
            return UnlockResolution { unlocked: None };
        };

        let unlocked = find_unlockable(artifact, &window).and_then(|index| {
            match artifact.set_node_unlocked(index) {
                Ok(_) => Some(index),
                Err(err) => {
                    tracing::warn!(artifact = %artifact.id, index, %err, "matched node could not be unlocked");
                    None
                }
            }
        });

        let feedback = match unlocked.and_then(|i| artifact.node_at(i)) {
            Some(node) => Feedback::UnlockSucceeded {
                artifact: artifact.id,
                node: node.id,
            },
            None => Feedback::UnlockFailed {
                artifact: artifact.id,
            },
        };
        tracing::info!(artifact = %artifact.id, ?unlocked, "unlocking window resolved");
        self.push_feedback(feedback);

        artifact.next_unlock_time = now + self.config.unlock.refractory();
        UnlockResolution { unlocked }
    }

    /// Fire a single node. Returns `false` for a degraded node.
    pub fn activate_node(
        &mut self,
        artifact: &mut Artifact,
        node: EntityId,
        request: &ActivationRequest,
        now: SimTime,
        consume_durability: bool,
    ) -> ArtifactResult<bool> {
        let index = artifact.index_of(node)?;
        self.activate_index(artifact, index, request, now, consume_durability)
    }

    fn activate_index(
        &mut self,
        artifact: &mut Artifact,
        index: usize,
        request: &ActivationRequest,
        now: SimTime,
        consume_durability: bool,
    ) -> ArtifactResult<bool> {
        let artifact_id = artifact.id;
        let node = artifact
            .node_at_mut(index)
            .ok_or(ArtifactError::VacantSlot(index))?;

        if node.is_degraded() {
            return Ok(false);
        }
        if consume_durability {
            node.adjust_durability(-1);
        }

        let activation = NodeActivated {
            artifact: artifact_id,
            node: node.id,
            effect: node.effect.clone(),
            user: request.user,
            target: request.target,
            location: request.location,
            time: now,
        };

        tracing::info!(
            target: "artifact_graph::audit",
            actor = ?request.user,
            node = %activation.node,
            artifact = %artifact_id,
            location = %request.location,
            time = %now,
            "node activated"
        );

        match self.effects.dispatch(&activation) {
            Some(visible) => {
                tracing::debug!(effect = %activation.effect, visible, "effect dispatched");
            }
            None => {
                tracing::debug!(effect = %activation.effect, "no handler registered for effect");
            }
        }
        Ok(true)
    }

    /// Direct activation: fire every node on the active frontier.
    ///
    /// Returns `false` only when the artifact is suppressed or cooling
    /// down. When no node fired, an [`Feedback::ActivationFailed`] is queued.
    pub fn try_activate_artifact(
        &mut self,
        artifact: &mut Artifact,
        request: &ActivationRequest,
        now: SimTime,
    ) -> bool {
        if artifact.suppressed || now < artifact.next_activation_time {
            return false;
        }
        artifact.next_activation_time = now + self.config.activation.cooldown();

        let active: Vec<usize> = artifact.active_indices().iter().copied().collect();
        let mut success = false;
        for index in active {
            match self.activate_index(artifact, index, request, now, true) {
                Ok(fired) => success |= fired,
                Err(err) => {
                    tracing::warn!(artifact = %artifact.id, index, %err, "stale active node skipped");
                }
            }
        }

        if !success {
            self.push_feedback(Feedback::ActivationFailed {
                artifact: artifact.id,
                user: request.user,
            });
        }
        true
    }

    /// Offer `event` to every node's trigger policy and trigger each node
    /// that accepts it. Returns the number of accepting nodes.
    pub fn relay_event(
        &mut self,
        artifact: &mut Artifact,
        event: &WorldEvent,
        now: SimTime,
    ) -> ArtifactResult<usize> {
        let relayed = RelayedEvent {
            artifact: artifact.id,
            event,
        };
        let accepted: Vec<EntityId> = artifact
            .all_nodes()
            .filter(|(_, node)| self.triggers.should_trigger(&relayed, node))
            .map(|(_, node)| node.id)
            .collect();

        for node in &accepted {
            self.trigger(artifact, Some(*node), now, false)?;
        }
        Ok(accepted.len())
    }
}

/// First recorded slot (ascending) that can be unlocked and whose required
/// set, `predecessors ∪ {slot}`, equals the recorded set. With the external
/// modifier applied the required set only needs to contain it.
///
/// Empty or out-of-range slots never match.
fn find_unlockable(artifact: &Artifact, window: &UnlockWindow) -> Option<usize> {
    let triggered = window.triggered();
    triggered.iter().copied().find(|&index| {
        if !artifact.can_unlock_node(index).unwrap_or(false) {
            return false;
        }
        let Ok(mut required) = artifact.predecessors(index) else {
            return false;
        };
        required.insert(index);

        if window.external_modifier_applied() {
            triggered.is_subset(&required)
        } else {
            &required == triggered
        }
    })
}
