//! # Artifact Rules
//!
//! Plain data for artifact puzzles: node identity, per-node lock and
//! durability state, simulation time, and configuration. Nothing in this
//! crate knows about the graph; see `artifact_graph` for that.

pub mod config;
pub mod entities;
pub mod mechanics;

pub use config::*;
pub use entities::*;
pub use mechanics::*;
