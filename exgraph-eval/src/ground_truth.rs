//! Ground-truth recovery for planted motifs.
//!
//! Each dataset variant plants fixed-size motif instances at ids that are
//! congruent modulo the motif size, so the instance containing a queried
//! node is recovered by pure arithmetic, with no lookup table:
//!
//! ```text
//! adjusted = node_id - base
//! offset   = adjusted mod motif_size
//! start    = adjusted - offset + base
//! ```
//!
//! The base alignment differs per variant because each synthetic builder
//! leaves a different number of basis nodes before the first motif.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use exgraph_core::{
    node_mask_from_members, node_mask_to_edge_mask, EdgeIndex, EdgeMask, MotifKind, Subgraph,
};

use crate::error::{EvalError, EvalResult};

/// Role label assigned to the first motif position; basis nodes get 0.
const MOTIF_ROLE_START: usize = 1;

// ============================================================================
// Dataset Variants
// ============================================================================

/// The synthetic dataset variants with planted-motif ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetVariant {
    /// BA base + houses.
    Syn1,
    /// Two BA communities + houses; same arithmetic as syn1.
    Syn2,
    /// BA base + 3x3 grids, first motif at id congruent to 3 (mod 9).
    Syn3,
    /// Tree base + 6-cycles, first motif at id congruent to 1 (mod 6).
    Syn4,
    /// Tree base + 3x3 grids, first motif at id congruent to 7 (mod 9).
    Syn5,
    /// BA base + bottles.
    Syn6,
    /// The standalone BA-shapes experiment; houses, same arithmetic as syn1.
    BaShapes,
}

impl DatasetVariant {
    /// The motif template planted by this variant.
    pub fn motif(&self) -> MotifKind {
        match self {
            DatasetVariant::Syn1 | DatasetVariant::Syn2 | DatasetVariant::BaShapes => {
                MotifKind::House
            }
            DatasetVariant::Syn3 | DatasetVariant::Syn5 => MotifKind::Grid { dim: 3 },
            DatasetVariant::Syn4 => MotifKind::Cycle { len: 6 },
            DatasetVariant::Syn6 => MotifKind::Bottle,
        }
    }

    /// Fixed motif instance size for this variant.
    pub fn motif_size(&self) -> usize {
        self.motif().size()
    }

    /// Base alignment offset of motif start ids.
    pub fn base_offset(&self) -> usize {
        match self {
            DatasetVariant::Syn1
            | DatasetVariant::Syn2
            | DatasetVariant::Syn6
            | DatasetVariant::BaShapes => 0,
            DatasetVariant::Syn3 => 3,
            DatasetVariant::Syn4 => 1,
            DatasetVariant::Syn5 => 7,
        }
    }

    /// Recover the motif instance containing `node_id`.
    ///
    /// Pure arithmetic over the variant's size and base alignment. Only
    /// defined for ids inside the planted-motif region; use [`GroundTruth`]
    /// for the guarded, dataset-aware version.
    pub fn resolve(&self, node_id: usize) -> EvalResult<MotifInstance> {
        let b = self.base_offset();
        let m = self.motif_size();
        let adjusted = node_id
            .checked_sub(b)
            .ok_or(EvalError::BackgroundNode {
                node: node_id,
                region_start: b,
            })?;
        let offset = adjusted % m;
        let start = adjusted - offset + b;
        Ok(MotifInstance {
            start,
            nodes: (0..m).map(|t| start + t).collect(),
        })
    }
}

impl fmt::Display for DatasetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetVariant::Syn1 => "syn1",
            DatasetVariant::Syn2 => "syn2",
            DatasetVariant::Syn3 => "syn3",
            DatasetVariant::Syn4 => "syn4",
            DatasetVariant::Syn5 => "syn5",
            DatasetVariant::Syn6 => "syn6",
            DatasetVariant::BaShapes => "ba_shapes",
        };
        write!(f, "{name}")
    }
}

impl FromStr for DatasetVariant {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "syn1" => Ok(DatasetVariant::Syn1),
            "syn2" => Ok(DatasetVariant::Syn2),
            "syn3" => Ok(DatasetVariant::Syn3),
            "syn4" => Ok(DatasetVariant::Syn4),
            "syn5" => Ok(DatasetVariant::Syn5),
            "syn6" => Ok(DatasetVariant::Syn6),
            "ba_shapes" => Ok(DatasetVariant::BaShapes),
            other => Err(EvalError::UnknownDataset(other.to_string())),
        }
    }
}

// ============================================================================
// Motif Instance
// ============================================================================

/// One recovered motif instance: a start offset plus its member node ids.
///
/// Invariant: `nodes[t] = start + t` for every template offset `t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotifInstance {
    /// Global id of the first motif node.
    pub start: usize,
    /// Member node ids, ascending.
    pub nodes: Vec<usize>,
}

// ============================================================================
// Ground Truth Resolver
// ============================================================================

/// The full ground truth for one explanation query.
#[derive(Debug, Clone)]
pub struct GroundTruthExplanation {
    /// The motif instance the queried node belongs to.
    pub instance: MotifInstance,
    /// The motif template graph over global node ids.
    pub graph: Subgraph,
    /// Role label per motif node (structural position).
    pub roles: Vec<usize>,
    /// Binary edge mask over the dataset edge index: 1 iff both endpoints
    /// are motif members.
    pub edge_mask: EdgeMask,
}

/// Dataset-aware ground-truth resolver.
///
/// Carries the start of the planted-motif region so that queries for
/// background (basis) nodes fail with a domain error instead of silently
/// returning a well-typed but meaningless instance.
#[derive(Debug, Clone, Copy)]
pub struct GroundTruth {
    variant: DatasetVariant,
    region_start: usize,
}

impl GroundTruth {
    /// Resolver with no background region (every id is assumed planted).
    pub fn new(variant: DatasetVariant) -> Self {
        Self {
            variant,
            region_start: 0,
        }
    }

    /// Resolver that rejects queries below `region_start` (the number of
    /// basis nodes preceding the first motif).
    pub fn with_region_start(variant: DatasetVariant, region_start: usize) -> Self {
        Self {
            variant,
            region_start,
        }
    }

    /// The dataset variant this resolver serves.
    pub fn variant(&self) -> DatasetVariant {
        self.variant
    }

    /// Recover the motif instance containing `node_id`, rejecting
    /// background nodes.
    pub fn resolve(&self, node_id: usize) -> EvalResult<MotifInstance> {
        if node_id < self.region_start {
            return Err(EvalError::BackgroundNode {
                node: node_id,
                region_start: self.region_start,
            });
        }
        self.variant.resolve(node_id)
    }

    /// Full ground truth for a query: motif subgraph, role assignment and
    /// the binary edge mask over `edge_index`.
    ///
    /// `num_nodes` is the total node count of the dataset; the intermediate
    /// node-membership mask has that length.
    pub fn ground_truth(
        &self,
        node_id: usize,
        edge_index: &EdgeIndex,
        num_nodes: usize,
    ) -> EvalResult<GroundTruthExplanation> {
        let instance = self.resolve(node_id)?;
        let (graph, roles) = self.variant.motif().build(instance.start, MOTIF_ROLE_START)?;
        let node_mask = node_mask_from_members(num_nodes, &instance.nodes)?;
        let edge_mask = node_mask_to_edge_mask(edge_index, &node_mask)?;
        Ok(GroundTruthExplanation {
            instance,
            graph,
            roles,
            edge_mask,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_house_resolution_example() {
        // node 12: offset = 12 mod 5 = 2, start = 10
        let inst = DatasetVariant::Syn1.resolve(12).unwrap();
        assert_eq!(inst.start, 10);
        assert_eq!(inst.nodes, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_motif_sizes_per_variant() {
        for (variant, size) in [
            (DatasetVariant::Syn1, 5),
            (DatasetVariant::Syn2, 5),
            (DatasetVariant::Syn3, 9),
            (DatasetVariant::Syn4, 6),
            (DatasetVariant::Syn5, 9),
            (DatasetVariant::Syn6, 5),
            (DatasetVariant::BaShapes, 5),
        ] {
            for node in [size + variant.base_offset(), 4 * size + variant.base_offset() + 1] {
                let inst = variant.resolve(node).unwrap();
                assert_eq!(inst.nodes.len(), size, "variant {variant}");
            }
        }
    }

    #[test]
    fn test_same_instance_same_nodes() {
        // every node of one grid instance resolves to the same member list
        let variant = DatasetVariant::Syn3;
        let first = variant.resolve(12).unwrap();
        for node in 12..21 {
            assert_eq!(variant.resolve(node).unwrap(), first);
        }
    }

    #[test]
    fn test_base_alignment_syn4() {
        // syn4: m=6, b=1; node 13 -> adjusted 12, offset 0, start 13
        let inst = DatasetVariant::Syn4.resolve(13).unwrap();
        assert_eq!(inst.start, 13);
        // node 18 is in the same instance
        assert_eq!(DatasetVariant::Syn4.resolve(18).unwrap().start, 13);
        // node 19 opens the next one
        assert_eq!(DatasetVariant::Syn4.resolve(19).unwrap().start, 19);
    }

    #[test]
    fn test_base_alignment_syn5() {
        // syn5: m=9, b=7; node 16 starts an instance
        let inst = DatasetVariant::Syn5.resolve(20).unwrap();
        assert_eq!(inst.start, 16);
        assert_eq!(inst.nodes, (16..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_background_node_rejected() {
        let gt = GroundTruth::with_region_start(DatasetVariant::Syn1, 300);
        let err = gt.resolve(120).unwrap_err();
        assert!(matches!(
            err,
            EvalError::BackgroundNode {
                node: 120,
                region_start: 300
            }
        ));
        assert!(gt.resolve(300).is_ok());
    }

    #[test]
    fn test_ground_truth_edge_mask() {
        // tiny graph: one house at 0..5 plus a stray edge to node 5
        let edge_index = EdgeIndex::from_undirected_pairs(&[
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 0),
            (4, 1),
            (3, 5),
        ]);
        let gt = GroundTruth::new(DatasetVariant::Syn1);
        let expl = gt.ground_truth(2, &edge_index, 6).unwrap();
        assert_eq!(expl.instance.nodes, vec![0, 1, 2, 3, 4]);
        assert_eq!(expl.roles, vec![1, 1, 2, 2, 3]);
        assert_eq!(expl.graph.edge_count(), 6);
        // the stray edge (both directions) is the only one masked out
        let mask = expl.edge_mask.to_vec();
        assert_eq!(mask.len(), 14);
        assert_eq!(mask.iter().filter(|&&x| x == 1.0).count(), 12);
        assert_eq!(mask[12], 0.0);
        assert_eq!(mask[13], 0.0);
    }

    #[test]
    fn test_unknown_dataset_rejected() {
        let err = "syn9".parse::<DatasetVariant>().unwrap_err();
        assert!(matches!(err, EvalError::UnknownDataset(_)));
    }
}
