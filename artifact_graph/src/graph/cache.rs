//! Derived caches: the active frontier, segments and node depths.
//!
//! Every rebuild is a full recomputation. Artifacts hold tens of nodes, so
//! the O(V^2) matrix scans are cheaper than tracking incremental updates.

use std::collections::BTreeSet;

use artifact_rules::EntityId;

use super::Artifact;

impl Artifact {
    /// Slots of the unlocked frontier as of the last rebuild.
    pub fn active_indices(&self) -> &BTreeSet<usize> {
        &self.active_nodes
    }

    pub fn active_node_ids(&self) -> Vec<EntityId> {
        self.active_nodes
            .iter()
            .filter_map(|&i| self.node_at(i))
            .map(|n| n.id)
            .collect()
    }

    /// Weakly connected components as of the last rebuild, ordered by their
    /// lowest slot.
    pub fn segments(&self) -> &[BTreeSet<usize>] {
        &self.segments
    }

    pub fn segment_of(&self, index: usize) -> Option<&BTreeSet<usize>> {
        self.segments.iter().find(|segment| segment.contains(&index))
    }

    /// True while a deferred edit is waiting for [`Artifact::rebuild_metadata`].
    pub fn caches_stale(&self) -> bool {
        self.caches_stale
    }

    /// Rebuild every derived cache.
    pub fn rebuild_metadata(&mut self) {
        self.rebuild_segments();
        self.rebuild_depths();
        self.rebuild_active_nodes();
        self.caches_stale = false;

        debug_assert!(
            self.check_invariants().is_ok(),
            "{:?}",
            self.check_invariants()
        );
    }

    /// An unlocked node is active when none of its direct successors is
    /// unlocked. Locked nodes are never active.
    pub fn rebuild_active_nodes(&mut self) {
        let active: BTreeSet<usize> = self
            .all_nodes()
            .filter(|(_, node)| !node.is_locked())
            .filter(|(index, _)| {
                !self
                    .adjacency
                    .row(*index)
                    .filter_map(|j| self.node_at(j))
                    .any(|successor| !successor.is_locked())
            })
            .map(|(index, _)| index)
            .collect();

        tracing::debug!(artifact = %self.id, active = ?active, "active nodes rebuilt");
        self.active_nodes = active;
    }

    /// Partition all nodes into weakly connected components.
    pub fn rebuild_segments(&mut self) {
        let mut assigned = BTreeSet::new();
        let mut segments = Vec::new();

        for start in self.all_node_indices() {
            if assigned.contains(&start) {
                continue;
            }

            let mut segment = BTreeSet::from([start]);
            let mut stack = vec![start];
            while let Some(current) = stack.pop() {
                let neighbors = self
                    .adjacency
                    .row(current)
                    .chain(self.adjacency.column(current));
                for neighbor in neighbors {
                    if segment.insert(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }

            assigned.extend(segment.iter().copied());
            segments.push(segment);
        }

        tracing::debug!(artifact = %self.id, count = segments.len(), "segments rebuilt");
        self.segments = segments;
    }

    /// Roots sit at depth 0; every other node sits one below its deepest
    /// direct predecessor.
    pub fn rebuild_depths(&mut self) {
        let n = self.vertex_count();
        let mut depths: Vec<Option<u32>> = vec![None; n];
        let mut remaining: Vec<usize> = self.all_node_indices().collect();

        // Kahn-style relaxation: a node is placed once all its predecessors are.
        while !remaining.is_empty() {
            let before = remaining.len();
            remaining.retain(|&index| {
                let mut depth = 0;
                for predecessor in self.adjacency.column(index) {
                    match depths.get(predecessor).copied().flatten() {
                        Some(d) => depth = depth.max(d + 1),
                        None => return true,
                    }
                }
                depths[index] = Some(depth);
                false
            });

            if remaining.len() == before {
                // Only reachable with a cycle loaded from outside; leave the
                // stragglers at their previous depth.
                tracing::warn!(artifact = %self.id, "cycle detected while computing depths");
                break;
            }
        }

        for (index, depth) in depths.into_iter().enumerate() {
            if let (Some(depth), Some(node)) = (depth, self.node_at_mut(index)) {
                node.depth = depth;
            }
        }
    }
}
