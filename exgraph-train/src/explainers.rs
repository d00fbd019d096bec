//! Edge-importance explainers and mask application.
//!
//! Explainers are a closed enum: unknown names are rejected when arguments
//! are parsed, not at first use. Each explainer returns one continuous
//! score per directed edge entry, with both directions of an undirected
//! edge sharing a score.

use std::collections::{HashMap, VecDeque};
use std::str::FromStr;

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use exgraph_core::EdgeMask;
use exgraph_eval::{FidelityParams, RelatedPreds};

use crate::error::{TrainError, TrainResult};
use crate::gcn::{argmax_rows, Gcn};
use crate::synthetic::SynData;

// ============================================================================
// Explainer Kinds
// ============================================================================

/// The available edge-importance explainers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplainerKind {
    /// Score each edge by the drop in target-class probability when that
    /// edge is occluded.
    Occlusion,
    /// Score each edge by inverse BFS distance to the queried node.
    InverseDistance,
    /// Seeded uniform scores; the sanity baseline.
    Random,
}

impl ExplainerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExplainerKind::Occlusion => "occlusion",
            ExplainerKind::InverseDistance => "distance",
            ExplainerKind::Random => "random",
        }
    }

    /// Compute an edge-importance mask for one queried node.
    pub fn explain(
        &self,
        model: &Gcn,
        data: &SynData,
        node_idx: usize,
        seed: u64,
    ) -> TrainResult<EdgeMask> {
        if node_idx >= data.num_nodes() {
            return Err(TrainError::InvalidConfig(format!(
                "query node {node_idx} out of range for {} nodes",
                data.num_nodes()
            )));
        }
        match self {
            ExplainerKind::Occlusion => Ok(occlusion_scores(model, data, node_idx)),
            ExplainerKind::InverseDistance => Ok(distance_scores(data, node_idx)),
            ExplainerKind::Random => Ok(random_scores(data, node_idx, seed)),
        }
    }
}

impl FromStr for ExplainerKind {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "occlusion" => Ok(ExplainerKind::Occlusion),
            "distance" => Ok(ExplainerKind::InverseDistance),
            "random" => Ok(ExplainerKind::Random),
            other => Err(TrainError::UnknownExplainer(other.to_string())),
        }
    }
}

// ============================================================================
// Explainer Implementations
// ============================================================================

fn occlusion_scores(model: &Gcn, data: &SynData, node_idx: usize) -> EdgeMask {
    let base = model.predict(&data.x, &data.edge_index);
    let target = argmax_rows(&base)[node_idx];
    let p0 = base[[node_idx, target]];

    // one forward per undirected pair, shared by both directions
    let mut pair_scores: HashMap<(usize, usize), f32> = HashMap::new();
    let mut scores = Array1::zeros(data.edge_index.len());
    for (i, (u, v)) in data.edge_index.iter().enumerate() {
        let key = (u.min(v), u.max(v));
        let score = *pair_scores.entry(key).or_insert_with(|| {
            let mut weights = Array1::ones(data.edge_index.len());
            for (j, (a, b)) in data.edge_index.iter().enumerate() {
                if (a.min(b), a.max(b)) == key {
                    weights[j] = 0.0;
                }
            }
            let probs = model.predict_weighted(&data.x, &data.edge_index, &weights);
            p0 - probs[[node_idx, target]]
        });
        scores[i] = score;
    }
    scores
}

fn distance_scores(data: &SynData, node_idx: usize) -> EdgeMask {
    // BFS over the undirected adjacency
    let n = data.num_nodes();
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (u, v) in data.edge_index.iter() {
        adj[u].push(v);
    }
    let mut dist = vec![usize::MAX; n];
    let mut queue = VecDeque::new();
    dist[node_idx] = 0;
    queue.push_back(node_idx);
    while let Some(u) = queue.pop_front() {
        for &v in &adj[u] {
            if dist[v] == usize::MAX {
                dist[v] = dist[u] + 1;
                queue.push_back(v);
            }
        }
    }

    let mut scores = Array1::zeros(data.edge_index.len());
    for (i, (u, v)) in data.edge_index.iter().enumerate() {
        let d = dist[u].min(dist[v]);
        if d != usize::MAX {
            scores[i] = 1.0 / (1.0 + d as f32);
        }
    }
    scores
}

fn random_scores(data: &SynData, node_idx: usize, seed: u64) -> EdgeMask {
    let mut rng = StdRng::seed_from_u64(seed ^ node_idx as u64);
    Array1::from_shape_fn(data.edge_index.len(), |_| rng.gen_range(0.0..1.0))
}

// ============================================================================
// Mask Application / Related Predictions
// ============================================================================

/// Split an edge-importance mask into important / unimportant edge weights
/// according to the fidelity parameters.
///
/// `sparsity` is the fraction of edges treated as unimportant; with
/// `hard_mask` the split is 0/1, otherwise the (optionally normalized)
/// scores themselves weight the edges.
pub fn split_mask(mask: &EdgeMask, params: &FidelityParams) -> (EdgeMask, EdgeMask) {
    let mut scores = mask.clone();
    if params.normalize {
        let min = scores.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        if max > min {
            scores.mapv_inplace(|x| (x - min) / (max - min));
        }
    }

    let mut sorted: Vec<f32> = scores.iter().cloned().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let cut = ((sorted.len() as f64 * params.sparsity) as usize).min(sorted.len() - 1);
    let threshold = sorted[cut];

    if params.hard_mask {
        let important = scores.mapv(|x| if x >= threshold { 1.0 } else { 0.0 });
        let unimportant = important.mapv(|x| 1.0 - x);
        (important, unimportant)
    } else {
        let important = scores.mapv(|x| if x >= threshold { x } else { 0.0 });
        let unimportant = scores.mapv(|x| if x >= threshold { 0.0 } else { 1.0 - x });
        (important, unimportant)
    }
}

/// Predictions for every queried node under the original, important-only
/// and unimportant-only graphs.
pub fn eval_related_pred(
    model: &Gcn,
    data: &SynData,
    edge_masks: &[(usize, EdgeMask)],
    params: &FidelityParams,
) -> TrainResult<RelatedPreds> {
    let base = model.predict(&data.x, &data.edge_index);
    let pred = argmax_rows(&base);

    let num_classes = data.num_classes;
    let mut node_idx = Vec::with_capacity(edge_masks.len());
    let mut true_label = Vec::with_capacity(edge_masks.len());
    let mut pred_label = Vec::with_capacity(edge_masks.len());
    let mut origin = Array2::zeros((edge_masks.len(), num_classes));
    let mut masked = Array2::zeros((edge_masks.len(), num_classes));
    let mut maskout = Array2::zeros((edge_masks.len(), num_classes));

    for (row, (node, mask)) in edge_masks.iter().enumerate() {
        let node = *node;
        if mask.len() != data.edge_index.len() {
            return Err(TrainError::InvalidConfig(format!(
                "edge mask for node {node} has length {}, expected {}",
                mask.len(),
                data.edge_index.len()
            )));
        }
        let (important, unimportant) = split_mask(mask, params);
        let masked_probs = model.predict_weighted(&data.x, &data.edge_index, &important);
        let maskout_probs = model.predict_weighted(&data.x, &data.edge_index, &unimportant);

        node_idx.push(node);
        true_label.push(data.y[node]);
        pred_label.push(pred[node]);
        origin.row_mut(row).assign(&base.row(node));
        masked.row_mut(row).assign(&masked_probs.row(node));
        maskout.row_mut(row).assign(&maskout_probs.row(node));
    }

    Ok(RelatedPreds {
        node_idx,
        true_label,
        pred_label,
        origin,
        masked,
        maskout,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcn::GcnConfig;
    use crate::synthetic::{build_synthetic, SyntheticConfig};
    use exgraph_eval::DatasetVariant;
    use ndarray::arr1;

    fn tiny() -> (SynData, Gcn) {
        let data = build_synthetic(&SyntheticConfig {
            variant: DatasetVariant::BaShapes,
            num_basis: 30,
            num_shapes: 4,
            attach_edges: 3,
            feature_dim: 4,
            train_ratio: 0.8,
            seed: 41,
        })
        .unwrap();
        let model = Gcn::new(GcnConfig::default(), 4, data.num_classes);
        (data, model)
    }

    #[test]
    fn test_unknown_explainer_rejected() {
        let err = "gnnexplainer9000".parse::<ExplainerKind>().unwrap_err();
        assert!(matches!(err, TrainError::UnknownExplainer(_)));
    }

    #[test]
    fn test_scores_cover_every_edge() {
        let (data, model) = tiny();
        for kind in [
            ExplainerKind::Occlusion,
            ExplainerKind::InverseDistance,
            ExplainerKind::Random,
        ] {
            let scores = kind.explain(&model, &data, 31, 7).unwrap();
            assert_eq!(scores.len(), data.edge_index.len(), "{}", kind.name());
        }
    }

    #[test]
    fn test_directions_share_scores() {
        let (data, model) = tiny();
        let scores = ExplainerKind::InverseDistance
            .explain(&model, &data, 31, 0)
            .unwrap();
        // undirected pairs are stored adjacently by the builder
        for i in (0..scores.len()).step_by(2) {
            assert_eq!(scores[i], scores[i + 1]);
        }
        let occ = ExplainerKind::Occlusion.explain(&model, &data, 31, 0).unwrap();
        for i in (0..occ.len()).step_by(2) {
            assert_eq!(occ[i], occ[i + 1]);
        }
    }

    #[test]
    fn test_distance_scores_peak_at_query() {
        let (data, _) = tiny();
        let node = 32;
        let scores = distance_scores(&data, node);
        let best = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        // an edge incident to the query node has the top score
        let (i, _) = data
            .edge_index
            .iter()
            .enumerate()
            .find(|&(_, (u, v))| u == node || v == node)
            .unwrap();
        assert_eq!(scores[i], best);
    }

    #[test]
    fn test_random_is_seeded() {
        let (data, _) = tiny();
        let a = random_scores(&data, 31, 7);
        let b = random_scores(&data, 31, 7);
        let c = random_scores(&data, 31, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_mask_hard() {
        let mask = arr1(&[0.9, 0.1, 0.5, 0.7]);
        let params = FidelityParams {
            sparsity: 0.5,
            normalize: false,
            hard_mask: true,
        };
        let (important, unimportant) = split_mask(&mask, &params);
        assert_eq!(important.to_vec(), vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(unimportant.to_vec(), vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_related_pred_shapes() {
        let (data, model) = tiny();
        let masks: Vec<_> = [31usize, 36]
            .iter()
            .map(|&n| {
                (
                    n,
                    ExplainerKind::InverseDistance
                        .explain(&model, &data, n, 0)
                        .unwrap(),
                )
            })
            .collect();
        let preds =
            eval_related_pred(&model, &data, &masks, &FidelityParams::default()).unwrap();
        assert_eq!(preds.node_idx, vec![31, 36]);
        assert_eq!(preds.origin.nrows(), 2);
        assert_eq!(preds.origin.ncols(), data.num_classes);
        let summary = preds.probability_summary().unwrap();
        assert!(summary.ori_probs >= 0.0 && summary.ori_probs <= 1.0);
    }
}
