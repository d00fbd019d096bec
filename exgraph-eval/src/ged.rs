//! Exact graph edit distance for motif-scale graphs.
//!
//! Uniform unit costs: node insertion/deletion and edge insertion/deletion
//! cost 1, substitutions are free (the graphs are unlabeled). The search is
//! a branch-and-bound over node mappings and therefore exponential in the
//! worst case; inputs above [`MAX_GED_NODES`] nodes are refused outright
//! rather than allowed to hang.

use exgraph_core::Subgraph;

use crate::error::{EvalError, EvalResult};

/// Hard bound on node count for exact edit-distance computation.
pub const MAX_GED_NODES: usize = 16;

/// Compute the exact graph edit distance between two unlabeled graphs.
pub fn graph_edit_distance(g1: &Subgraph, g2: &Subgraph) -> EvalResult<f64> {
    let a: Vec<usize> = g1.nodes().collect();
    let b: Vec<usize> = g2.nodes().collect();
    let largest = a.len().max(b.len());
    if largest > MAX_GED_NODES {
        return Err(EvalError::GraphTooLarge {
            nodes: largest,
            max: MAX_GED_NODES,
        });
    }

    // Trivial upper bound: delete everything, insert everything.
    let upper = a.len() + b.len() + g1.edge_count() + g2.edge_count();
    let mut search = GedSearch {
        g1,
        g2,
        a,
        b,
        mapping: Vec::new(),
        used: Vec::new(),
        best: upper,
    };
    search.used = vec![false; search.b.len()];
    search.descend(0, 0);
    Ok(search.best as f64)
}

struct GedSearch<'a> {
    g1: &'a Subgraph,
    g2: &'a Subgraph,
    a: Vec<usize>,
    b: Vec<usize>,
    /// mapping[k] = Some(j) if a[k] maps to b[j], None if a[k] is deleted
    mapping: Vec<Option<usize>>,
    used: Vec<bool>,
    best: usize,
}

impl GedSearch<'_> {
    fn descend(&mut self, i: usize, cost: usize) {
        if cost + self.lower_bound(i) >= self.best {
            return;
        }
        if i == self.a.len() {
            let total = cost + self.leaf_cost();
            if total < self.best {
                self.best = total;
            }
            return;
        }

        // Try mapping a[i] onto each unused g2 node.
        for j in 0..self.b.len() {
            if self.used[j] {
                continue;
            }
            let delta = self.pair_cost(i, Some(j));
            self.used[j] = true;
            self.mapping.push(Some(j));
            self.descend(i + 1, cost + delta);
            self.mapping.pop();
            self.used[j] = false;
        }

        // Or delete a[i]: the node itself plus its edges to prior nodes.
        let delta = 1 + self.pair_cost(i, None);
        self.mapping.push(None);
        self.descend(i + 1, cost + delta);
        self.mapping.pop();
    }

    /// Edge cost of extending the mapping with `a[i] -> image` against all
    /// previously placed nodes.
    fn pair_cost(&self, i: usize, image: Option<usize>) -> usize {
        let mut cost = 0;
        for k in 0..i {
            let has_e1 = self.g1.contains_edge(self.a[k], self.a[i]);
            let has_e2 = match (self.mapping[k], image) {
                (Some(jk), Some(ji)) => self.g2.contains_edge(self.b[jk], self.b[ji]),
                _ => false,
            };
            if has_e1 != has_e2 {
                cost += 1;
            }
        }
        cost
    }

    /// Cost of the g2 remainder once every g1 node is placed: unmatched
    /// nodes are insertions, as is every g2 edge touching one of them.
    fn leaf_cost(&self) -> usize {
        let unmatched_nodes = self.used.iter().filter(|&&u| !u).count();
        let mut cost = unmatched_nodes;
        if unmatched_nodes > 0 {
            for (u, v, _) in self.g2.all_edges() {
                if !self.is_matched(u) || !self.is_matched(v) {
                    cost += 1;
                }
            }
        }
        cost
    }

    fn is_matched(&self, node: usize) -> bool {
        self.b
            .iter()
            .position(|&x| x == node)
            .map(|j| self.used[j])
            .unwrap_or(false)
    }

    /// Remaining node operations can never cost less than the difference in
    /// unplaced node counts.
    fn lower_bound(&self, i: usize) -> usize {
        let remaining_a = self.a.len() - i;
        let remaining_b = self.used.iter().filter(|&&u| !u).count();
        remaining_a.abs_diff(remaining_b)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use exgraph_core::{subgraph_from_edges, MotifKind};

    #[test]
    fn test_identical_graphs_have_zero_distance() {
        let (g, _) = MotifKind::House.build(10, 1).unwrap();
        assert_eq!(graph_edit_distance(&g, &g).unwrap(), 0.0);
    }

    #[test]
    fn test_single_edge_removal() {
        let g1 = subgraph_from_edges([(0, 1), (1, 2), (2, 0)]);
        let g2 = subgraph_from_edges([(0, 1), (1, 2)]);
        // one edge deletion; node sets match after mapping
        assert_eq!(graph_edit_distance(&g1, &g2).unwrap(), 1.0);
    }

    #[test]
    fn test_node_insertion_with_edge() {
        let g1 = subgraph_from_edges([(0, 1)]);
        let g2 = subgraph_from_edges([(0, 1), (1, 2)]);
        // insert node 2 and its edge
        assert_eq!(graph_edit_distance(&g1, &g2).unwrap(), 2.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let (house, _) = MotifKind::House.build(0, 1).unwrap();
        let (bottle, _) = MotifKind::Bottle.build(0, 1).unwrap();
        let d1 = graph_edit_distance(&house, &bottle).unwrap();
        let d2 = graph_edit_distance(&bottle, &house).unwrap();
        assert_eq!(d1, d2);
        // house = bottle + one roof edge
        assert_eq!(d1, 1.0);
    }

    #[test]
    fn test_empty_graphs() {
        let g1 = Subgraph::new();
        let g2 = subgraph_from_edges([(0, 1)]);
        assert_eq!(graph_edit_distance(&g1, &g1).unwrap(), 0.0);
        assert_eq!(graph_edit_distance(&g1, &g2).unwrap(), 3.0);
    }

    #[test]
    fn test_oversized_graph_refused() {
        let g: Subgraph = subgraph_from_edges((0..20).map(|i| (i, i + 1)));
        let err = graph_edit_distance(&g, &g).unwrap_err();
        assert!(matches!(err, EvalError::GraphTooLarge { .. }));
    }
}
