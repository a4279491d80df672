//! Boundary types between the engine and the host: relayed world events,
//! effect handlers, trigger policies and user-facing feedback.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use artifact_rules::{ArtifactNode, EffectKey, EntityId, Location, SimTime, TriggerKey};

/// Any world interaction the host forwards to an artifact. The engine never
/// looks inside `payload`; only trigger policies do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WorldEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// A world event as offered to one node of an artifact.
#[derive(Debug, Clone, Copy)]
pub struct RelayedEvent<'a> {
    pub artifact: EntityId,
    pub event: &'a WorldEvent,
}

/// Who activated what, and where.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivationRequest {
    pub user: Option<EntityId>,
    pub target: Option<EntityId>,
    pub location: Location,
}

/// Notification delivered to the effect handler of an activated node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeActivated {
    pub artifact: EntityId,
    pub node: EntityId,
    pub effect: EffectKey,
    pub user: Option<EntityId>,
    pub target: Option<EntityId>,
    pub location: Location,
    pub time: SimTime,
}

/// Produces the gameplay effect of a node kind.
pub trait EffectHandler {
    /// Returns whether anything visible happened.
    ///
    /// The value is informational and only logged. The node counts as fired
    /// either way, so returning `false` never produces
    /// [`Feedback::ActivationFailed`].
    fn apply(&mut self, activation: &NodeActivated) -> bool;
}

impl<F> EffectHandler for F
where
    F: FnMut(&NodeActivated) -> bool,
{
    fn apply(&mut self, activation: &NodeActivated) -> bool {
        self(activation)
    }
}

/// Decides whether a relayed event should trigger a node.
pub trait TriggerPolicy {
    fn should_trigger(&self, relayed: &RelayedEvent<'_>, node: &ArtifactNode) -> bool;
}

impl<F> TriggerPolicy for F
where
    F: Fn(&RelayedEvent<'_>, &ArtifactNode) -> bool,
{
    fn should_trigger(&self, relayed: &RelayedEvent<'_>, node: &ArtifactNode) -> bool {
        self(relayed, node)
    }
}

/// Effect handlers keyed by the node's effect tag.
#[derive(Default)]
pub struct EffectRegistry {
    handlers: HashMap<EffectKey, Box<dyn EffectHandler>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the same key.
    pub fn register(&mut self, key: impl Into<String>, handler: impl EffectHandler + 'static) {
        self.handlers.insert(EffectKey::new(key), Box::new(handler));
    }

    pub fn contains(&self, key: &EffectKey) -> bool {
        self.handlers.contains_key(key)
    }

    /// Deliver `activation` to its handler. `None` when no handler is
    /// registered for the effect.
    pub fn dispatch(&mut self, activation: &NodeActivated) -> Option<bool> {
        self.handlers
            .get_mut(&activation.effect)
            .map(|handler| handler.apply(activation))
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

/// Trigger policies keyed by the node's trigger tag.
#[derive(Default)]
pub struct TriggerRegistry {
    policies: HashMap<TriggerKey, Box<dyn TriggerPolicy>>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<String>, policy: impl TriggerPolicy + 'static) {
        self.policies.insert(TriggerKey::new(key), Box::new(policy));
    }

    /// Nodes whose trigger tag has no registered policy never trigger.
    pub fn should_trigger(&self, relayed: &RelayedEvent<'_>, node: &ArtifactNode) -> bool {
        self.policies
            .get(&node.trigger)
            .is_some_and(|policy| policy.should_trigger(relayed, node))
    }
}

impl std::fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.policies.keys()).finish()
    }
}

/// User-facing notifications the host should present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    /// A direct activation was processed but no node fired.
    ActivationFailed {
        artifact: EntityId,
        user: Option<EntityId>,
    },

    /// An unlocking window closed and a node was unlocked.
    UnlockSucceeded { artifact: EntityId, node: EntityId },

    /// An unlocking window closed without a matching node.
    UnlockFailed { artifact: EntityId },
}

/// Receives feedback as soon as it is produced.
pub trait FeedbackSink {
    fn deliver(&mut self, feedback: &Feedback);
}

impl<F> FeedbackSink for F
where
    F: FnMut(&Feedback),
{
    fn deliver(&mut self, feedback: &Feedback) {
        self(feedback)
    }
}

/// Default sink: one `tracing` record per message on target
/// `artifact_graph::feedback`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFeedbackSink;

impl FeedbackSink for TracingFeedbackSink {
    fn deliver(&mut self, feedback: &Feedback) {
        match feedback {
            Feedback::ActivationFailed { artifact, user } => {
                tracing::info!(
                    target: "artifact_graph::feedback",
                    artifact = %artifact,
                    user = ?user,
                    "activation failed"
                );
            }
            Feedback::UnlockSucceeded { artifact, node } => {
                tracing::info!(
                    target: "artifact_graph::feedback",
                    artifact = %artifact,
                    node = %node,
                    "unlock succeeded"
                );
            }
            Feedback::UnlockFailed { artifact } => {
                tracing::info!(
                    target: "artifact_graph::feedback",
                    artifact = %artifact,
                    "unlock failed"
                );
            }
        }
    }
}
