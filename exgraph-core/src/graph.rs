//! Graph representations: explanation subgraphs and the GNN edge list.
//!
//! Two views of the same synthetic graph coexist here. [`Subgraph`] is an
//! undirected graph over global node ids, used for motif instances and
//! extracted explanations where set operations (intersection, edit
//! distance) are the point. [`EdgeIndex`] is the flat paired-endpoint edge
//! list the GNN consumes, where masks are aligned to edge positions.

use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// An undirected graph over global (already offset) node ids.
///
/// `UnGraphMap` keys edges by unordered node pair, so two subgraphs built
/// over the same id space compare structurally without index remapping.
pub type Subgraph = UnGraphMap<usize, ()>;

/// Build a [`Subgraph`] from an iterator of undirected edges.
pub fn subgraph_from_edges<I>(edges: I) -> Subgraph
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut g = Subgraph::new();
    for (u, v) in edges {
        g.add_edge(u, v, ());
    }
    g
}

// ============================================================================
// Edge Index
// ============================================================================

/// Paired endpoint lists representing the edge list consumed by the GNN.
///
/// Invariant: `rows.len() == cols.len()`. For undirected graphs each edge
/// appears in both directions, so masks aligned to this structure carry one
/// entry per direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeIndex {
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl EdgeIndex {
    /// Create from endpoint lists, enforcing the equal-length invariant.
    pub fn new(rows: Vec<usize>, cols: Vec<usize>) -> CoreResult<Self> {
        if rows.len() != cols.len() {
            return Err(CoreError::EdgeLengthMismatch {
                rows: rows.len(),
                cols: cols.len(),
            });
        }
        Ok(Self { rows, cols })
    }

    /// Create from directed endpoint pairs as given.
    pub fn from_pairs(pairs: &[(usize, usize)]) -> Self {
        let rows = pairs.iter().map(|&(u, _)| u).collect();
        let cols = pairs.iter().map(|&(_, v)| v).collect();
        Self { rows, cols }
    }

    /// Create from undirected pairs, storing both directions per edge.
    pub fn from_undirected_pairs(pairs: &[(usize, usize)]) -> Self {
        let mut rows = Vec::with_capacity(pairs.len() * 2);
        let mut cols = Vec::with_capacity(pairs.len() * 2);
        for &(u, v) in pairs {
            rows.push(u);
            cols.push(v);
            rows.push(v);
            cols.push(u);
        }
        Self { rows, cols }
    }

    /// Number of (directed) edge entries.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the edge list is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Endpoints of edge `i`.
    pub fn endpoints(&self, i: usize) -> (usize, usize) {
        (self.rows[i], self.cols[i])
    }

    /// Iterate over `(row, col)` endpoint pairs in edge order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().copied().zip(self.cols.iter().copied())
    }

    /// Row endpoints (source side).
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Col endpoints (target side).
    pub fn cols(&self) -> &[usize] {
        &self.cols
    }

    /// Smallest node count containing every referenced id.
    pub fn min_num_nodes(&self) -> usize {
        self.iter()
            .map(|(u, v)| u.max(v) + 1)
            .max()
            .unwrap_or(0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_index_length_invariant() {
        let err = EdgeIndex::new(vec![0, 1], vec![1]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::EdgeLengthMismatch { rows: 2, cols: 1 }
        ));
    }

    #[test]
    fn test_undirected_pairs_store_both_directions() {
        let ei = EdgeIndex::from_undirected_pairs(&[(0, 1), (1, 2)]);
        assert_eq!(ei.len(), 4);
        assert_eq!(ei.endpoints(0), (0, 1));
        assert_eq!(ei.endpoints(1), (1, 0));
        assert_eq!(ei.endpoints(3), (2, 1));
    }

    #[test]
    fn test_min_num_nodes() {
        let ei = EdgeIndex::from_pairs(&[(0, 5), (2, 3)]);
        assert_eq!(ei.min_num_nodes(), 6);
        assert_eq!(EdgeIndex::from_pairs(&[]).min_num_nodes(), 0);
    }

    #[test]
    fn test_subgraph_from_edges_is_undirected() {
        let g = subgraph_from_edges([(0, 1), (1, 0), (1, 2)]);
        assert_eq!(g.edge_count(), 2);
        assert!(g.contains_edge(2, 1));
    }
}
