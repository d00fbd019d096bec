//! Canonical motif templates planted into synthetic graphs.
//!
//! Each template is a small fixed graph whose node ids are
//! `start, start + 1, ..., start + size - 1`. Two instances of the same
//! motif have identical internal topology and differ only by the additive
//! id offset, which is what makes modular-arithmetic ground-truth recovery
//! possible downstream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::graph::{subgraph_from_edges, Subgraph};

/// A motif template kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotifKind {
    /// Five nodes: a 4-cycle with a roof node bridging the top corners.
    House,
    /// A dim x dim lattice, row-major node order.
    Grid { dim: usize },
    /// A simple ring of `len` nodes.
    Cycle { len: usize },
    /// Five nodes: a 4-cycle with a neck node attached to one corner.
    Bottle,
}

impl MotifKind {
    /// Number of nodes in one instance of this motif.
    pub fn size(&self) -> usize {
        match self {
            MotifKind::House | MotifKind::Bottle => 5,
            MotifKind::Grid { dim } => dim * dim,
            MotifKind::Cycle { len } => *len,
        }
    }

    /// Canonical relative node offsets `[0, 1, ..., size - 1]`.
    pub fn template_base(&self) -> Vec<usize> {
        (0..self.size()).collect()
    }

    /// Build one motif instance with node ids `start..start + size` and a
    /// role label per node distinguishing structural position.
    ///
    /// Deterministic given inputs; no randomness.
    pub fn build(&self, start: usize, role_start: usize) -> CoreResult<(Subgraph, Vec<usize>)> {
        match self {
            MotifKind::House => {
                let graph = subgraph_from_edges([
                    (start, start + 1),
                    (start + 1, start + 2),
                    (start + 2, start + 3),
                    (start + 3, start),
                    (start + 4, start),
                    (start + 4, start + 1),
                ]);
                let roles = vec![
                    role_start,
                    role_start,
                    role_start + 1,
                    role_start + 1,
                    role_start + 2,
                ];
                Ok((graph, roles))
            }
            MotifKind::Bottle => {
                let graph = subgraph_from_edges([
                    (start, start + 1),
                    (start + 1, start + 2),
                    (start + 2, start + 3),
                    (start + 3, start),
                    (start + 4, start),
                ]);
                let roles = vec![
                    role_start,
                    role_start,
                    role_start + 1,
                    role_start + 1,
                    role_start + 2,
                ];
                Ok((graph, roles))
            }
            MotifKind::Cycle { len } => {
                if *len < 3 {
                    return Err(CoreError::InvalidMotif(format!(
                        "cycle length must be at least 3, got {len}"
                    )));
                }
                let mut edges: Vec<(usize, usize)> = (0..len - 1)
                    .map(|i| (start + i, start + i + 1))
                    .collect();
                edges.push((start + len - 1, start));
                Ok((subgraph_from_edges(edges), vec![role_start; *len]))
            }
            MotifKind::Grid { dim } => {
                if *dim < 2 {
                    return Err(CoreError::InvalidMotif(format!(
                        "grid dimension must be at least 2, got {dim}"
                    )));
                }
                let dim = *dim;
                let mut edges = Vec::with_capacity(2 * dim * (dim - 1));
                for r in 0..dim {
                    for c in 0..dim {
                        let id = start + r * dim + c;
                        if c + 1 < dim {
                            edges.push((id, id + 1));
                        }
                        if r + 1 < dim {
                            edges.push((id, id + dim));
                        }
                    }
                }
                Ok((subgraph_from_edges(edges), vec![role_start; dim * dim]))
            }
        }
    }
}

impl fmt::Display for MotifKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotifKind::House => write!(f, "house"),
            MotifKind::Grid { dim } => write!(f, "grid{dim}x{dim}"),
            MotifKind::Cycle { len } => write!(f, "cycle{len}"),
            MotifKind::Bottle => write!(f, "bottle"),
        }
    }
}

impl FromStr for MotifKind {
    type Err = CoreError;

    /// Parse a motif name. Unknown names are rejected here, at
    /// configuration time, rather than at first use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "house" => Ok(MotifKind::House),
            "grid" => Ok(MotifKind::Grid { dim: 3 }),
            "cycle" => Ok(MotifKind::Cycle { len: 6 }),
            "bottle" => Ok(MotifKind::Bottle),
            other => Err(CoreError::UnknownMotif(other.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_house_topology() {
        let (g, roles) = MotifKind::House.build(10, 1).unwrap();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 6);
        assert!(g.contains_edge(10, 11));
        assert!(g.contains_edge(13, 10));
        assert!(g.contains_edge(14, 10));
        assert!(g.contains_edge(14, 11));
        assert!(!g.contains_edge(14, 12));
        assert_eq!(roles, vec![1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_bottle_topology() {
        let (g, roles) = MotifKind::Bottle.build(0, 1).unwrap();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 5);
        assert!(g.contains_edge(4, 0));
        assert!(!g.contains_edge(4, 1));
        assert_eq!(roles.len(), 5);
    }

    #[test]
    fn test_cycle_topology() {
        let (g, roles) = MotifKind::Cycle { len: 6 }.build(7, 1).unwrap();
        assert_eq!(g.node_count(), 6);
        assert_eq!(g.edge_count(), 6);
        assert!(g.contains_edge(12, 7));
        assert_eq!(roles, vec![1; 6]);
    }

    #[test]
    fn test_grid_topology() {
        let (g, _) = MotifKind::Grid { dim: 3 }.build(0, 1).unwrap();
        assert_eq!(g.node_count(), 9);
        // 3x3 lattice has 12 edges
        assert_eq!(g.edge_count(), 12);
        assert!(g.contains_edge(0, 1));
        assert!(g.contains_edge(0, 3));
        assert!(g.contains_edge(4, 7));
        assert!(!g.contains_edge(2, 3));
    }

    #[test]
    fn test_instances_differ_only_by_offset() {
        let (a, roles_a) = MotifKind::House.build(0, 1).unwrap();
        let (b, roles_b) = MotifKind::House.build(35, 1).unwrap();
        assert_eq!(roles_a, roles_b);
        for (u, v, _) in a.all_edges() {
            assert!(b.contains_edge(u + 35, v + 35));
        }
    }

    #[test]
    fn test_unknown_motif_name_rejected() {
        let err = "triangle".parse::<MotifKind>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownMotif(_)));
    }

    #[test]
    fn test_degenerate_parameters_rejected() {
        assert!(MotifKind::Cycle { len: 2 }.build(0, 0).is_err());
        assert!(MotifKind::Grid { dim: 1 }.build(0, 0).is_err());
    }
}
