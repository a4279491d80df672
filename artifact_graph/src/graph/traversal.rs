//! Read-only traversal over the adjacency matrix.

use std::collections::BTreeSet;

use super::Artifact;
use crate::error::ArtifactResult;

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

impl Artifact {
    /// Slots with an edge into `index`.
    pub fn direct_predecessors(&self, index: usize) -> ArtifactResult<BTreeSet<usize>> {
        self.check_index(index)?;
        Ok(self.adjacency.column(index).collect())
    }

    /// Slots `index` has an edge to.
    pub fn direct_successors(&self, index: usize) -> ArtifactResult<BTreeSet<usize>> {
        self.check_index(index)?;
        Ok(self.adjacency.row(index).collect())
    }

    /// Every slot that can reach `index`, excluding `index` itself.
    pub fn predecessors(&self, index: usize) -> ArtifactResult<BTreeSet<usize>> {
        self.check_index(index)?;
        Ok(self.closure(index, Direction::Backward))
    }

    /// Every slot reachable from `index`, excluding `index` itself.
    pub fn successors(&self, index: usize) -> ArtifactResult<BTreeSet<usize>> {
        self.check_index(index)?;
        Ok(self.closure(index, Direction::Forward))
    }

    pub fn has_edge(&self, from: usize, to: usize) -> ArtifactResult<bool> {
        self.check_index(from)?;
        self.check_index(to)?;
        Ok(self.adjacency.get(from, to))
    }

    /// Iterative DFS. The visited set keeps it finite even on a cyclic
    /// matrix loaded from outside.
    fn closure(&self, start: usize, direction: Direction) -> BTreeSet<usize> {
        let mut visited = BTreeSet::new();
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            let next: Vec<usize> = match direction {
                Direction::Forward => self.adjacency.row(current).collect(),
                Direction::Backward => self.adjacency.column(current).collect(),
            };
            for neighbor in next {
                if neighbor != start && visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }

        visited
    }
}
