//! Graph store - the artifact's sparse vertex table and adjacency matrix.
//!
//! Nodes live in numbered slots. A slot index is the node's identity inside
//! the matrix, so slots are never compacted: removing a node leaves a hole
//! that the next [`Artifact::add_node`] fills, and the matrix only grows.

mod cache;
mod matrix;
mod traversal;

pub use matrix::*;

use artifact_rules::{ArtifactNode, EntityId, SimTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{ArtifactError, ArtifactResult};
use crate::unlock::UnlockWindow;

/// The graph container: owns its nodes and the edges between them.
///
/// Loading goes through [`ArtifactRecord`], so a save whose shape breaks
/// [`Artifact::check_invariants`] fails to deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ArtifactRecord")]
pub struct Artifact {
    pub id: EntityId,

    vertices: Vec<Option<ArtifactNode>>,
    adjacency: AdjacencyMatrix,

    /// Slots of the unlocked frontier.
    #[serde(skip)]
    active_nodes: BTreeSet<usize>,

    /// Weakly connected components, as sets of slots.
    #[serde(skip)]
    segments: Vec<BTreeSet<usize>>,

    /// Set by deferred edits until the next [`Artifact::rebuild_metadata`].
    #[serde(skip)]
    caches_stale: bool,

    /// While set, direct activation is refused.
    pub suppressed: bool,

    /// Direct activation is refused before this time.
    pub next_activation_time: SimTime,

    /// Non-forced triggers are ignored before this time.
    pub next_unlock_time: SimTime,

    unlocking: Option<UnlockWindow>,
}

/// Persisted fields of an [`Artifact`]; caches are rebuilt after load.
#[derive(Deserialize)]
struct ArtifactRecord {
    id: EntityId,
    vertices: Vec<Option<ArtifactNode>>,
    adjacency: AdjacencyMatrix,
    suppressed: bool,
    next_activation_time: SimTime,
    next_unlock_time: SimTime,
    unlocking: Option<UnlockWindow>,
}

impl TryFrom<ArtifactRecord> for Artifact {
    type Error = ArtifactError;

    fn try_from(record: ArtifactRecord) -> Result<Self, Self::Error> {
        let artifact = Self {
            id: record.id,
            vertices: record.vertices,
            adjacency: record.adjacency,
            active_nodes: BTreeSet::new(),
            segments: Vec::new(),
            caches_stale: true,
            suppressed: record.suppressed,
            next_activation_time: record.next_activation_time,
            next_unlock_time: record.next_unlock_time,
            unlocking: record.unlocking,
        };
        artifact.check_invariants()?;
        Ok(artifact)
    }
}

impl Default for Artifact {
    fn default() -> Self {
        Self::with_id(EntityId::new())
    }
}

impl Artifact {
    /// Create an empty artifact with a fresh ID.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: EntityId) -> Self {
        Self {
            id,
            vertices: Vec::new(),
            adjacency: AdjacencyMatrix::new(),
            active_nodes: BTreeSet::new(),
            segments: Vec::new(),
            caches_stale: false,
            suppressed: false,
            next_activation_time: SimTime::ZERO,
            next_unlock_time: SimTime::ZERO,
            unlocking: None,
        }
    }

    /// Number of vertex slots, holes included.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of attached nodes.
    pub fn node_count(&self) -> usize {
        self.vertices.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }

    pub fn adjacency(&self) -> &AdjacencyMatrix {
        &self.adjacency
    }

    /// Slot of `node`, or `NotFound` if it is not attached here.
    pub fn index_of(&self, node: EntityId) -> ArtifactResult<usize> {
        self.vertices
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|n| n.id == node))
            .ok_or(ArtifactError::NotFound(node))
    }

    /// Read a slot. Out-of-range indices and holes both read as `None`.
    pub fn node_at(&self, index: usize) -> Option<&ArtifactNode> {
        self.vertices.get(index).and_then(Option::as_ref)
    }

    pub fn node_at_mut(&mut self, index: usize) -> Option<&mut ArtifactNode> {
        self.vertices.get_mut(index).and_then(Option::as_mut)
    }

    pub fn node(&self, id: EntityId) -> Option<&ArtifactNode> {
        self.index_of(id).ok().and_then(|i| self.node_at(i))
    }

    pub fn node_mut(&mut self, id: EntityId) -> Option<&mut ArtifactNode> {
        let index = self.index_of(id).ok()?;
        self.node_at_mut(index)
    }

    /// Attached nodes with their slots, in slot order.
    pub fn all_nodes(&self) -> impl Iterator<Item = (usize, &ArtifactNode)> {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (i, node)))
    }

    pub fn all_node_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.all_nodes().map(|(i, _)| i)
    }

    /// First empty slot, growing the table and matrix by one if there is none.
    pub fn free_index(&mut self) -> usize {
        if let Some(index) = self.vertices.iter().position(Option::is_none) {
            return index;
        }
        self.vertices.push(None);
        self.adjacency.grow(1);
        self.vertices.len() - 1
    }

    /// Attach a detached node and return its slot.
    pub fn add_node(&mut self, mut node: ArtifactNode, dirty: bool) -> ArtifactResult<usize> {
        if let Some(owner) = node.attached_artifact() {
            return Err(ArtifactError::AlreadyAttached {
                node: node.id,
                artifact: owner,
            });
        }

        let index = self.free_index();
        node.attach(self.id);
        tracing::debug!(artifact = %self.id, node = %node.id, index, "node added");
        self.vertices[index] = Some(node);

        self.structure_changed(dirty);
        Ok(index)
    }

    /// Attach `node`, wiring `parent -> node` when a parent is given.
    ///
    /// The new node sits one level below its parent.
    pub fn create_node_after(
        &mut self,
        parent: Option<EntityId>,
        node: ArtifactNode,
        dirty: bool,
    ) -> ArtifactResult<usize> {
        let parent_index = parent.map(|id| self.index_of(id)).transpose()?;
        let depth = parent_index
            .and_then(|i| self.node_at(i))
            .map(|p| p.depth + 1)
            .unwrap_or(0);

        let index = self.add_node(node.with_depth(depth), dirty && parent_index.is_none())?;
        if let Some(parent_index) = parent_index {
            self.add_edge_at(parent_index, index, dirty)?;
        }
        Ok(index)
    }

    /// Detach a node together with every edge touching its slot.
    ///
    /// The slot is also dropped from an open unlocking window, even when the
    /// rebuild is deferred, so a node later placed in the same slot does not
    /// inherit the trigger. Returns `None` if the node is not attached here.
    pub fn remove_node(&mut self, node: EntityId, dirty: bool) -> Option<ArtifactNode> {
        let index = self.index_of(node).ok()?;

        let removed_edges = self.adjacency.clear_index(index);
        let mut removed = self.vertices[index].take()?;
        removed.detach();
        if let Some(window) = self.unlocking.as_mut() {
            window.forget(index);
        }
        tracing::debug!(
            artifact = %self.id,
            node = %node,
            index,
            edges = removed_edges.len(),
            "node removed"
        );

        self.structure_changed(dirty);
        Some(removed)
    }

    /// Add `from -> to`. Returns `false` if the edge already exists.
    pub fn add_edge(&mut self, from: EntityId, to: EntityId, dirty: bool) -> ArtifactResult<bool> {
        let from = self.index_of(from)?;
        let to = self.index_of(to)?;
        self.add_edge_at(from, to, dirty)
    }

    /// Slot-addressed [`Artifact::add_edge`].
    ///
    /// Both slots must hold a node; an edge that would close a cycle
    /// (including a self-loop) is rejected.
    pub fn add_edge_at(&mut self, from: usize, to: usize, dirty: bool) -> ArtifactResult<bool> {
        self.occupied(from)?;
        self.occupied(to)?;

        if self.adjacency.get(from, to) {
            return Ok(false);
        }
        if from == to || self.successors(to)?.contains(&from) {
            tracing::warn!(artifact = %self.id, from, to, "rejected cycle-forming edge");
            return Err(ArtifactError::CycleDetected { from, to });
        }

        self.adjacency.set(from, to, true);
        tracing::debug!(artifact = %self.id, from, to, "edge added");
        self.structure_changed(dirty);
        Ok(true)
    }

    /// Remove `from -> to`. Returns `false` if there was no such edge.
    pub fn remove_edge(&mut self, from: EntityId, to: EntityId, dirty: bool) -> ArtifactResult<bool> {
        let from = self.index_of(from)?;
        let to = self.index_of(to)?;
        self.remove_edge_at(from, to, dirty)
    }

    pub fn remove_edge_at(&mut self, from: usize, to: usize, dirty: bool) -> ArtifactResult<bool> {
        self.occupied(from)?;
        self.occupied(to)?;

        if !self.adjacency.set(from, to, false) {
            return Ok(false);
        }
        tracing::debug!(artifact = %self.id, from, to, "edge removed");
        self.structure_changed(dirty);
        Ok(true)
    }

    /// Direct adjacency test between two attached nodes.
    pub fn node_has_edge(&self, from: EntityId, to: EntityId) -> ArtifactResult<bool> {
        let from = self.index_of(from)?;
        let to = self.index_of(to)?;
        self.has_edge(from, to)
    }

    /// Unlock the node in `index` and refresh the frontier.
    ///
    /// Returns `false` if it was already unlocked.
    pub fn set_node_unlocked(&mut self, index: usize) -> ArtifactResult<bool> {
        let id = self.id;
        let node = self.occupied_mut(index)?;
        if !node.set_unlocked() {
            return Ok(false);
        }
        tracing::info!(artifact = %id, node = %node.id, index, "node unlocked");
        self.rebuild_active_nodes();
        Ok(true)
    }

    /// Unlock every attached node.
    pub fn unlock_all_nodes(&mut self) {
        for node in self.vertices.iter_mut().flatten() {
            node.set_unlocked();
        }
        self.rebuild_active_nodes();
    }

    /// A locked node can be unlocked once it is a root or at least one of
    /// its direct predecessors is already unlocked.
    pub fn can_unlock_node(&self, index: usize) -> ArtifactResult<bool> {
        if !self.occupied(index)?.is_locked() {
            return Ok(false);
        }
        let predecessors = self.direct_predecessors(index)?;
        Ok(predecessors.is_empty()
            || predecessors
                .iter()
                .filter_map(|&i| self.node_at(i))
                .any(|p| !p.is_locked()))
    }

    /// Sum of the research value of every attached node.
    pub fn total_research_value(&self) -> u64 {
        self.all_nodes().map(|(_, n)| u64::from(n.research_value)).sum()
    }

    /// Debug dump of the adjacency matrix.
    pub fn render_matrix(&self) -> String {
        format!("\n{}", self.adjacency)
    }

    /// The open unlocking window, if any.
    pub fn unlocking(&self) -> Option<&UnlockWindow> {
        self.unlocking.as_ref()
    }

    pub(crate) fn unlocking_mut(&mut self) -> Option<&mut UnlockWindow> {
        self.unlocking.as_mut()
    }

    pub(crate) fn set_unlocking(&mut self, window: UnlockWindow) {
        self.unlocking = Some(window);
    }

    pub(crate) fn take_unlocking(&mut self) -> Option<UnlockWindow> {
        self.unlocking.take()
    }

    /// Verify the shape and ownership invariants.
    pub fn check_invariants(&self) -> ArtifactResult<()> {
        let n = self.vertices.len();
        if self.adjacency.len() != n || !self.adjacency.is_square() {
            return Err(ArtifactError::InvariantViolation(format!(
                "adjacency matrix is not {n}x{n}"
            )));
        }

        for (index, node) in self.all_nodes() {
            if node.attached_artifact() != Some(self.id) {
                return Err(ArtifactError::InvariantViolation(format!(
                    "node {} in slot {index} is not attached to artifact {}",
                    node.id, self.id
                )));
            }
        }

        if let Some((from, to)) = self
            .adjacency
            .edges()
            .find(|&(from, to)| self.node_at(from).is_none() || self.node_at(to).is_none())
        {
            return Err(ArtifactError::InvariantViolation(format!(
                "edge {from} -> {to} touches an empty slot"
            )));
        }

        if let Some(index) = self
            .unlocking
            .iter()
            .flat_map(|window| window.triggered().iter().copied())
            .find(|&index| self.node_at(index).is_none())
        {
            return Err(ArtifactError::InvariantViolation(format!(
                "unlocking window records empty slot {index}"
            )));
        }
        Ok(())
    }

    /// Rebuild or defer caches after a structural edit. An immediate rebuild
    /// also cancels any open unlocking window.
    fn structure_changed(&mut self, dirty: bool) {
        if !dirty {
            self.caches_stale = true;
            return;
        }
        if self.unlocking.take().is_some() {
            tracing::debug!(artifact = %self.id, "unlocking window cancelled by graph edit");
        }
        self.rebuild_metadata();
    }

    pub(crate) fn check_index(&self, index: usize) -> ArtifactResult<()> {
        if index >= self.vertices.len() {
            return Err(ArtifactError::OutOfRange {
                index,
                len: self.vertices.len(),
            });
        }
        Ok(())
    }

    fn occupied(&self, index: usize) -> ArtifactResult<&ArtifactNode> {
        self.check_index(index)?;
        self.node_at(index).ok_or(ArtifactError::VacantSlot(index))
    }

    fn occupied_mut(&mut self, index: usize) -> ArtifactResult<&mut ArtifactNode> {
        self.check_index(index)?;
        self.node_at_mut(index).ok_or(ArtifactError::VacantSlot(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> ArtifactNode {
        ArtifactNode::new("EffectNoop", "TriggerInteraction").with_max_durability(3)
    }

    /// Attach `count` fresh nodes without rebuilding caches.
    fn artifact_with(count: usize) -> (Artifact, Vec<EntityId>) {
        let mut artifact = Artifact::new();
        let ids = (0..count)
            .map(|_| {
                let n = node();
                let id = n.id;
                artifact.add_node(n, false).unwrap();
                id
            })
            .collect();
        (artifact, ids)
    }

    #[test]
    fn test_add_nodes_and_edges() {
        let (mut artifact, ids) = artifact_with(3);
        assert_eq!(artifact.node_count(), 3);

        assert!(artifact.add_edge(ids[0], ids[1], false).unwrap());
        assert!(artifact.add_edge(ids[1], ids[2], false).unwrap());

        assert_eq!(artifact.direct_successors(0).unwrap().len(), 1);
        assert_eq!(artifact.successors(0).unwrap().len(), 2);
        assert!(artifact.direct_predecessors(0).unwrap().is_empty());
        assert!(artifact.predecessors(0).unwrap().is_empty());

        assert_eq!(artifact.direct_successors(1).unwrap().len(), 1);
        assert_eq!(artifact.predecessors(1).unwrap().len(), 1);

        assert!(artifact.successors(2).unwrap().is_empty());
        assert_eq!(artifact.predecessors(2).unwrap().len(), 2);
        artifact.check_invariants().unwrap();
    }

    #[test]
    fn test_add_edge_is_idempotent() {
        let (mut artifact, ids) = artifact_with(2);
        assert!(artifact.add_edge(ids[0], ids[1], true).unwrap());
        let once = artifact.adjacency().clone();

        assert!(!artifact.add_edge(ids[0], ids[1], true).unwrap());
        assert_eq!(artifact.adjacency(), &once);
        assert_eq!(artifact.edge_count(), 1);
    }

    #[test]
    fn test_remove_missing_edge() {
        let (mut artifact, ids) = artifact_with(2);
        assert!(!artifact.remove_edge(ids[0], ids[1], true).unwrap());

        artifact.add_edge(ids[0], ids[1], true).unwrap();
        assert!(artifact.remove_edge(ids[0], ids[1], true).unwrap());
        assert!(!artifact.node_has_edge(ids[0], ids[1]).unwrap());
    }

    #[test]
    fn test_edge_on_unattached_node() {
        let (mut artifact, ids) = artifact_with(1);
        let stranger = EntityId::new();
        assert_eq!(
            artifact.add_edge(ids[0], stranger, true),
            Err(ArtifactError::NotFound(stranger))
        );
        assert_eq!(
            artifact.add_edge_at(0, 5, true),
            Err(ArtifactError::OutOfRange { index: 5, len: 1 })
        );
    }

    #[test]
    fn test_rejects_cycles() {
        let (mut artifact, ids) = artifact_with(3);
        artifact.add_edge(ids[0], ids[1], false).unwrap();
        artifact.add_edge(ids[1], ids[2], false).unwrap();

        assert_eq!(
            artifact.add_edge(ids[2], ids[0], false),
            Err(ArtifactError::CycleDetected { from: 2, to: 0 })
        );
        assert_eq!(
            artifact.add_edge(ids[1], ids[1], false),
            Err(ArtifactError::CycleDetected { from: 1, to: 1 })
        );
        assert_eq!(artifact.edge_count(), 2);
    }

    #[test]
    fn test_add_attached_node_fails() {
        let (mut artifact, _) = artifact_with(0);
        let owner = EntityId::new();
        let mut attached = node();
        attached.attach(owner);

        assert_eq!(
            artifact.add_node(attached.clone(), true),
            Err(ArtifactError::AlreadyAttached {
                node: attached.id,
                artifact: owner
            })
        );

        attached.detach();
        assert!(artifact.add_node(attached, true).is_ok());
    }

    #[test]
    fn test_remove_node_cleans_edges() {
        let (mut artifact, ids) = artifact_with(5);
        for pair in ids.windows(2) {
            artifact.add_edge(pair[0], pair[1], false).unwrap();
        }
        assert_eq!(artifact.successors(0).unwrap().len(), 4);
        assert_eq!(artifact.predecessors(4).unwrap().len(), 4);

        let removed = artifact.remove_node(ids[2], false).unwrap();
        assert!(removed.attached_artifact().is_none());
        assert!(artifact.index_of(ids[2]).is_err());

        assert_eq!(artifact.successors(1).unwrap(), BTreeSet::new());
        assert_eq!(artifact.predecessors(3).unwrap(), BTreeSet::new());
        assert!(artifact.remove_node(ids[2], false).is_none());
        artifact.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_node_removes_exactly_its_edges() {
        // 0 -> 2, 1 -> 2, 2 -> 3, 0 -> 1, 3 -> 4
        let (mut artifact, ids) = artifact_with(5);
        artifact.add_edge(ids[0], ids[2], false).unwrap();
        artifact.add_edge(ids[1], ids[2], false).unwrap();
        artifact.add_edge(ids[2], ids[3], false).unwrap();
        artifact.add_edge(ids[0], ids[1], false).unwrap();
        artifact.add_edge(ids[3], ids[4], false).unwrap();

        artifact.remove_node(ids[2], true).unwrap();

        assert_eq!(artifact.edge_count(), 2);
        assert!(artifact.has_edge(0, 1).unwrap());
        assert!(artifact.has_edge(3, 4).unwrap());
    }

    #[test]
    fn test_resize_keeps_indices_and_edges() {
        let (mut artifact, ids) = artifact_with(3);
        artifact.add_edge(ids[0], ids[1], false).unwrap();
        artifact.add_edge(ids[1], ids[2], false).unwrap();

        let extra = node();
        let extra_id = extra.id;
        assert_eq!(artifact.add_node(extra, true).unwrap(), 3);

        assert!(artifact.node_has_edge(ids[0], ids[1]).unwrap());
        assert!(artifact.node_has_edge(ids[1], ids[2]).unwrap());
        assert!(!artifact.node_has_edge(ids[1], ids[0]).unwrap());
        assert!(!artifact.node_has_edge(ids[0], ids[2]).unwrap());
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(artifact.index_of(*id).unwrap(), i);
        }
        let extra_index = artifact.index_of(extra_id).unwrap();
        assert!(artifact.predecessors(extra_index).unwrap().is_empty());
        assert!(artifact.successors(extra_index).unwrap().is_empty());
    }

    #[test]
    fn test_hole_is_reused() {
        let (mut artifact, ids) = artifact_with(3);
        artifact.add_edge(ids[0], ids[1], false).unwrap();
        artifact.add_edge(ids[1], ids[2], false).unwrap();

        artifact.remove_node(ids[1], false).unwrap();
        assert_eq!(artifact.vertex_count(), 3);
        assert_eq!(artifact.adjacency().len(), 3);

        assert_eq!(artifact.add_node(node(), false).unwrap(), 1);
        assert_eq!(artifact.vertex_count(), 3);
        assert_eq!(artifact.adjacency().len(), 3);
        assert!(artifact.successors(0).unwrap().is_empty());
        assert!(artifact.predecessors(2).unwrap().is_empty());
        assert!(artifact.successors(1).unwrap().is_empty());
    }

    #[test]
    fn test_node_at_bounds() {
        let (artifact, ids) = artifact_with(1);
        assert_eq!(artifact.node_at(0).map(|n| n.id), Some(ids[0]));
        assert!(artifact.node_at(1).is_none());
    }

    #[test]
    fn test_create_node_after_parent() {
        let (mut artifact, ids) = artifact_with(1);
        let child = node();
        let child_id = child.id;

        let index = artifact.create_node_after(Some(ids[0]), child, true).unwrap();
        assert!(artifact.has_edge(0, index).unwrap());
        assert_eq!(artifact.node(child_id).unwrap().depth, 1);

        let root = artifact.create_node_after(None, node(), true).unwrap();
        assert_eq!(artifact.node_at(root).unwrap().depth, 0);
    }

    #[test]
    fn test_can_unlock_node() {
        let (mut artifact, ids) = artifact_with(3);
        artifact.add_edge(ids[0], ids[1], false).unwrap();
        artifact.add_edge(ids[1], ids[2], true).unwrap();

        assert!(artifact.can_unlock_node(0).unwrap());
        assert!(!artifact.can_unlock_node(1).unwrap());

        artifact.set_node_unlocked(0).unwrap();
        assert!(!artifact.can_unlock_node(0).unwrap());
        assert!(artifact.can_unlock_node(1).unwrap());
        assert!(!artifact.can_unlock_node(2).unwrap());
    }

    #[test]
    fn test_research_and_unlock_all() {
        let mut artifact = Artifact::new();
        artifact
            .add_node(node().with_research_value(100), false)
            .unwrap();
        artifact
            .add_node(node().with_research_value(250), true)
            .unwrap();
        assert_eq!(artifact.total_research_value(), 350);

        artifact.unlock_all_nodes();
        assert!(artifact.all_nodes().all(|(_, n)| !n.is_locked()));
        assert_eq!(artifact.active_indices().len(), 2);
    }

    #[test]
    fn test_invariant_detects_foreign_node() {
        let (mut artifact, ids) = artifact_with(1);
        artifact.check_invariants().unwrap();

        artifact.node_mut(ids[0]).unwrap().detach();
        assert!(matches!(
            artifact.check_invariants(),
            Err(ArtifactError::InvariantViolation(_))
        ));

        artifact.node_mut(ids[0]).unwrap().attach(EntityId::new());
        assert!(artifact.check_invariants().is_err());
    }

    #[test]
    fn test_deferred_remove_forgets_triggered_slot() {
        let (mut artifact, ids) = artifact_with(2);
        let mut window = UnlockWindow::open(SimTime::ZERO, std::time::Duration::from_secs(1));
        window.record(0);
        window.record(1);
        artifact.set_unlocking(window);

        artifact.remove_node(ids[0], false).unwrap();
        let window = artifact.unlocking().unwrap();
        assert_eq!(window.triggered(), &BTreeSet::from([1]));

        // The reused slot starts out untriggered.
        assert_eq!(artifact.add_node(node(), false).unwrap(), 0);
        assert!(!artifact.unlocking().unwrap().has_triggered(0));
        artifact.check_invariants().unwrap();
    }

    #[test]
    fn test_invariant_detects_window_on_empty_slot() {
        let (mut artifact, _) = artifact_with(1);
        let mut window = UnlockWindow::open(SimTime::ZERO, std::time::Duration::from_secs(1));
        window.record(4);
        artifact.set_unlocking(window);

        assert!(matches!(
            artifact.check_invariants(),
            Err(ArtifactError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_load_rejects_malformed_matrix() {
        let (artifact, _) = artifact_with(1);
        let mut value = serde_json::to_value(&artifact).unwrap();
        value["adjacency"]["rows"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!([false, false]));

        let err = serde_json::from_value::<Artifact>(value).unwrap_err();
        assert!(err.to_string().contains("adjacency matrix is not 1x1"), "{err}");
    }

    #[test]
    fn test_load_marks_caches_stale() {
        let (mut artifact, _) = artifact_with(2);
        artifact.rebuild_metadata();
        assert!(!artifact.caches_stale());

        let value = serde_json::to_value(&artifact).unwrap();
        let loaded: Artifact = serde_json::from_value(value).unwrap();
        assert!(loaded.caches_stale());
        assert_eq!(loaded.node_count(), 2);
    }
}
