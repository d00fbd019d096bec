//! Node and edge masks aligned to graph order.
//!
//! Masks are created fresh per explanation query and never mutated after
//! creation. Ground-truth masks are binary {0, 1}; predicted masks carry
//! continuous importance scores.

use ndarray::Array1;

use crate::error::{CoreError, CoreResult};
use crate::graph::EdgeIndex;

/// A mask aligned to node order.
pub type NodeMask = Array1<f32>;

/// A mask aligned to edge order of an [`EdgeIndex`].
pub type EdgeMask = Array1<f32>;

/// Build a binary node mask of length `num_nodes` with 1 at each member id.
pub fn node_mask_from_members(num_nodes: usize, members: &[usize]) -> CoreResult<NodeMask> {
    let mut mask = Array1::zeros(num_nodes);
    for &node in members {
        if node >= num_nodes {
            return Err(CoreError::NodeOutOfRange {
                node,
                len: num_nodes,
            });
        }
        mask[node] = 1.0;
    }
    Ok(mask)
}

/// Map a node mask onto edges: `edge_mask[i] = 1` iff both endpoints of
/// edge `i` have node mask 1.
///
/// Deterministic and O(edges); re-deriving from the same node mask always
/// yields the same edge mask.
pub fn node_mask_to_edge_mask(edge_index: &EdgeIndex, node_mask: &NodeMask) -> CoreResult<EdgeMask> {
    let n = node_mask.len();
    let mut edge_mask = Array1::zeros(edge_index.len());
    for (i, (u, v)) in edge_index.iter().enumerate() {
        if u >= n {
            return Err(CoreError::NodeOutOfRange { node: u, len: n });
        }
        if v >= n {
            return Err(CoreError::NodeOutOfRange { node: v, len: n });
        }
        if node_mask[u] == 1.0 && node_mask[v] == 1.0 {
            edge_mask[i] = 1.0;
        }
    }
    Ok(edge_mask)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_mask_from_members() {
        let mask = node_mask_from_members(5, &[1, 3]).unwrap();
        assert_eq!(mask.to_vec(), vec![0.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_node_mask_rejects_out_of_range() {
        let err = node_mask_from_members(3, &[5]).unwrap_err();
        assert!(matches!(err, CoreError::NodeOutOfRange { node: 5, len: 3 }));
    }

    #[test]
    fn test_edge_mask_requires_both_endpoints() {
        let ei = EdgeIndex::from_pairs(&[(0, 1), (1, 2), (2, 3)]);
        let nm = node_mask_from_members(4, &[1, 2]).unwrap();
        let em = node_mask_to_edge_mask(&ei, &nm).unwrap();
        assert_eq!(em.to_vec(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_edge_mask_is_idempotent() {
        let ei = EdgeIndex::from_undirected_pairs(&[(0, 1), (1, 2), (0, 2)]);
        let nm = node_mask_from_members(3, &[0, 1, 2]).unwrap();
        let first = node_mask_to_edge_mask(&ei, &nm).unwrap();
        let second = node_mask_to_edge_mask(&ei, &nm).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|&x| x == 1.0));
    }
}
