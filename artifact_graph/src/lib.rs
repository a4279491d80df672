//! # Artifact Graph
//!
//! The puzzle engine behind artifacts: a directed graph of nodes attached to
//! an artifact, the caches derived from it, and the timed unlocking state
//! machine that decides which node opens next.
//!
//! ## Core Components
//!
//! - **graph**: Sparse vertex table, adjacency matrix, structural edits,
//!   traversal queries and the derived caches (frontier, segments, depths)
//! - **unlock**: The unlocking window state machine and node activation
//! - **events**: Host boundary - relayed world events, effect handlers,
//!   trigger policies and user-facing feedback
//!
//! ## Design Philosophy
//!
//! - **Index-addressed**: Slot indices are stable node identities inside an
//!   artifact; the matrix only grows
//! - **Explicit time**: Every time-dependent call takes `now`, nothing reads
//!   a global clock
//! - **Pluggable behavior**: Effects and triggers are looked up by tag in
//!   host-supplied registries

pub mod error;
pub mod events;
pub mod graph;
pub mod unlock;

pub use error::*;
pub use events::*;
pub use graph::*;
pub use unlock::*;
