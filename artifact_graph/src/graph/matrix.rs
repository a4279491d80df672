//! Square boolean adjacency matrix addressed by vertex slot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `rows[i][j] == true` means a directed edge from slot `i` to slot `j`.
///
/// The matrix only ever grows, so an index handed out once keeps addressing
/// the same row and column for the lifetime of the artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    rows: Vec<Vec<bool>>,
}

impl AdjacencyMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (and, when square, columns).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when every row has exactly `len()` columns.
    pub fn is_square(&self) -> bool {
        let n = self.rows.len();
        self.rows.iter().all(|row| row.len() == n)
    }

    /// Append `additional` empty rows and columns.
    pub fn grow(&mut self, additional: usize) {
        let new_len = self.rows.len() + additional;
        for row in &mut self.rows {
            row.resize(new_len, false);
        }
        self.rows.resize_with(new_len, || vec![false; new_len]);
    }

    /// Read an edge. Out-of-range coordinates read as `false`.
    pub fn get(&self, from: usize, to: usize) -> bool {
        self.rows
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(false)
    }

    /// Write an edge and return the previous value.
    ///
    /// Callers bounds-check first; out-of-range writes are ignored.
    pub fn set(&mut self, from: usize, to: usize, value: bool) -> bool {
        match self.rows.get_mut(from).and_then(|row| row.get_mut(to)) {
            Some(cell) => std::mem::replace(cell, value),
            None => false,
        }
    }

    /// Clear row and column `index`, returning every edge that was removed.
    pub fn clear_index(&mut self, index: usize) -> Vec<(usize, usize)> {
        let mut removed = Vec::new();
        for other in 0..self.rows.len() {
            if self.set(index, other, false) {
                removed.push((index, other));
            }
            if other != index && self.set(other, index, false) {
                removed.push((other, index));
            }
        }
        removed
    }

    /// Slots with an edge into `index`.
    pub fn column(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, row)| row.get(index).copied().unwrap_or(false))
            .map(|(i, _)| i)
    }

    /// Slots `index` has an edge to.
    pub fn row(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .get(index)
            .into_iter()
            .flat_map(|row| row.iter().enumerate())
            .filter(|(_, edge)| **edge)
            .map(|(j, _)| j)
    }

    pub fn edge_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|edge| **edge).count())
            .sum()
    }

    /// All edges in row-major order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows.len()).flat_map(move |i| self.row(i).map(move |j| (i, j)))
    }
}

/// Renders a grid for debugging, one `X` per edge:
///
/// ```text
///   | 00| 01|
/// --+---+---+
/// 00|   | X |
/// --+---+---+
/// 01|   |   |
/// --+---+---+
/// ```
impl fmt::Display for AdjacencyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.rows.len();
        let filler = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            write!(f, "--+")?;
            for _ in 0..n {
                write!(f, "---+")?;
            }
            writeln!(f)
        };

        write!(f, "  |")?;
        for i in 0..n {
            write!(f, " {:02}|", i)?;
        }
        writeln!(f)?;
        filler(f)?;

        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{:02}|", i)?;
            for edge in row {
                write!(f, " {} |", if *edge { 'X' } else { ' ' })?;
            }
            writeln!(f)?;
            filler(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_keeps_edges() {
        let mut matrix = AdjacencyMatrix::new();
        matrix.grow(2);
        matrix.set(0, 1, true);

        matrix.grow(3);
        assert_eq!(matrix.len(), 5);
        assert!(matrix.is_square());
        assert!(matrix.get(0, 1));
        assert!(!matrix.get(1, 0));
        assert!(!matrix.get(4, 4));
    }

    #[test]
    fn test_out_of_range_reads_false() {
        let mut matrix = AdjacencyMatrix::new();
        matrix.grow(1);
        assert!(!matrix.get(3, 0));
        assert!(!matrix.set(3, 0, true));
        assert_eq!(matrix.edge_count(), 0);
    }

    #[test]
    fn test_clear_index() {
        let mut matrix = AdjacencyMatrix::new();
        matrix.grow(4);
        matrix.set(0, 2, true);
        matrix.set(1, 2, true);
        matrix.set(2, 3, true);
        matrix.set(0, 1, true);

        let mut removed = matrix.clear_index(2);
        removed.sort();
        assert_eq!(removed, vec![(0, 2), (1, 2), (2, 3)]);
        assert_eq!(matrix.edges().collect::<Vec<_>>(), vec![(0, 1)]);
    }

    #[test]
    fn test_row_and_column() {
        let mut matrix = AdjacencyMatrix::new();
        matrix.grow(3);
        matrix.set(0, 1, true);
        matrix.set(0, 2, true);
        matrix.set(1, 2, true);

        assert_eq!(matrix.row(0).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(matrix.column(2).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(matrix.row(7).count(), 0);
    }

    #[test]
    fn test_display() {
        let mut matrix = AdjacencyMatrix::new();
        matrix.grow(2);
        matrix.set(0, 1, true);

        let expected = "  | 00| 01|\n\
                        --+---+---+\n\
                        00|   | X |\n\
                        --+---+---+\n\
                        01|   |   |\n\
                        --+---+---+\n";
        assert_eq!(matrix.to_string(), expected);
    }
}
