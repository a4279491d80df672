//! Error type shared by every fallible graph operation.

use artifact_rules::EntityId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("node {0} is not attached to this artifact")]
    NotFound(EntityId),

    #[error("vertex slot {0} holds no node")]
    VacantSlot(usize),

    #[error("index {index} out of range for {len} vertex slots")]
    OutOfRange { index: usize, len: usize },

    #[error("node {node} is already attached to artifact {artifact}")]
    AlreadyAttached { node: EntityId, artifact: EntityId },

    #[error("edge {from} -> {to} would close a cycle")]
    CycleDetected { from: usize, to: usize },

    #[error("artifact invariant violated: {0}")]
    InvariantViolation(String),
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;
