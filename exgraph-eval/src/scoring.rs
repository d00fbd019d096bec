//! Scoring predicted explanation subgraphs against ground truth.
//!
//! Precision, recall and F1 come from the edge-set intersection of the two
//! graphs; graph edit distance from the exact search in [`crate::ged`]; and
//! AUC from the ROC curve over the continuous edge scores with the binary
//! ground-truth edge mask as labels.

use exgraph_core::{EdgeIndex, EdgeMask, Subgraph};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};
use crate::explanation::extract_explanation;
use crate::ged::graph_edit_distance;
use crate::ground_truth::GroundTruthExplanation;

/// Positive label of the binary ground-truth edge encoding.
pub const POSITIVE_LABEL: f32 = 1.0;

// ============================================================================
// Graph-vs-Graph Scores
// ============================================================================

/// Set-intersection scores of one predicted explanation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphScores {
    pub recall: f64,
    pub precision: f64,
    pub f1: f64,
    pub ged: f64,
}

/// Compare a predicted explanation subgraph against the ground-truth motif.
///
/// True positives are the edges present in both graphs (isolated nodes play
/// no part). Precision and recall fail with
/// [`EvalError::UndefinedScore`] when their denominator is zero — a
/// prediction with no edges, or an empty ground truth, has no defined
/// ratio and must not silently become NaN.
pub fn score_graphs(predicted: &Subgraph, truth: &Subgraph) -> EvalResult<GraphScores> {
    let tp = predicted
        .all_edges()
        .filter(|&(u, v, _)| truth.contains_edge(u, v))
        .count();
    let fp = predicted.edge_count() - tp;
    let fn_ = truth.edge_count() - tp;

    if tp + fp == 0 {
        return Err(EvalError::UndefinedScore {
            metric: "precision",
        });
    }
    if tp + fn_ == 0 {
        return Err(EvalError::UndefinedScore { metric: "recall" });
    }

    let precision = tp as f64 / (tp + fp) as f64;
    let recall = tp as f64 / (tp + fn_) as f64;
    let f1 = if tp == 0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    let ged = graph_edit_distance(predicted, truth)?;

    Ok(GraphScores {
        recall,
        precision,
        f1,
        ged,
    })
}

// ============================================================================
// ROC / AUC
// ============================================================================

/// ROC curve points, thresholds descending.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

/// Compute the ROC curve treating `labels == pos_label` as positive.
///
/// The positive label is explicit because the encoding of ground-truth
/// masks has varied across implementations (a summed-endpoints encoding
/// marks positives with 2; the binary both-endpoints encoding used here
/// marks them with 1).
pub fn roc_curve(labels: &EdgeMask, scores: &EdgeMask, pos_label: f32) -> EvalResult<RocCurve> {
    if labels.len() != scores.len() {
        return Err(EvalError::ScoreLength {
            expected: labels.len(),
            actual: scores.len(),
        });
    }
    let positives = labels.iter().filter(|&&l| l == pos_label).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(EvalError::UndefinedScore { metric: "auc" });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut idx = 0;
    while idx < order.len() {
        let threshold = scores[order[idx]];
        // consume every edge sharing this score before emitting a point
        while idx < order.len() && scores[order[idx]] == threshold {
            if labels[order[idx]] == pos_label {
                tp += 1;
            } else {
                fp += 1;
            }
            idx += 1;
        }
        fpr.push(fp as f64 / negatives as f64);
        tpr.push(tp as f64 / positives as f64);
        thresholds.push(threshold as f64);
    }

    Ok(RocCurve {
        fpr,
        tpr,
        thresholds,
    })
}

/// Area under a curve by trapezoidal integration.
pub fn auc(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

/// ROC-AUC of continuous edge scores against a binary ground-truth mask.
pub fn roc_auc_score(labels: &EdgeMask, scores: &EdgeMask, pos_label: f32) -> EvalResult<f64> {
    let curve = roc_curve(labels, scores, pos_label)?;
    Ok(auc(&curve.fpr, &curve.tpr))
}

// ============================================================================
// Per-Query Report
// ============================================================================

/// Full evaluation of one explanation query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub recall: f64,
    pub precision: f64,
    pub f1: f64,
    pub ged: f64,
    pub auc: f64,
}

/// Evaluate a learned edge mask against resolved ground truth: extract the
/// explanation subgraph, score it against the motif, and compute AUC over
/// the raw scores.
pub fn evaluate_explanation(
    ground_truth: &GroundTruthExplanation,
    edge_index: &EdgeIndex,
    edge_scores: &EdgeMask,
    num_top_edges: usize,
    hard_mask: bool,
) -> EvalResult<ScoreReport> {
    let predicted = extract_explanation(edge_index, edge_scores, num_top_edges, hard_mask)?;
    let scores = score_graphs(&predicted, &ground_truth.graph)?;
    let auc = roc_auc_score(&ground_truth.edge_mask, edge_scores, POSITIVE_LABEL)?;
    Ok(ScoreReport {
        recall: scores.recall,
        precision: scores.precision,
        f1: scores.f1,
        ged: scores.ged,
        auc,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use exgraph_core::{subgraph_from_edges, MotifKind};
    use ndarray::arr1;

    #[test]
    fn test_graph_against_itself() {
        let (g, _) = MotifKind::House.build(0, 1).unwrap();
        let s = score_graphs(&g, &g).unwrap();
        assert_eq!(s.precision, 1.0);
        assert_eq!(s.recall, 1.0);
        assert_eq!(s.f1, 1.0);
        assert_eq!(s.ged, 0.0);
    }

    #[test]
    fn test_disjoint_graphs() {
        let g1 = subgraph_from_edges([(0, 1), (1, 2)]);
        let g2 = subgraph_from_edges([(10, 11), (11, 12)]);
        let s = score_graphs(&g1, &g2).unwrap();
        assert_eq!(s.precision, 0.0);
        assert_eq!(s.recall, 0.0);
        assert_eq!(s.f1, 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let truth = subgraph_from_edges([(0, 1), (1, 2), (2, 3)]);
        let pred = subgraph_from_edges([(0, 1), (1, 2), (5, 6)]);
        let s = score_graphs(&pred, &truth).unwrap();
        assert!((s.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((s.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((s.f1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_prediction_is_domain_error() {
        let truth = subgraph_from_edges([(0, 1)]);
        let pred = Subgraph::new();
        let err = score_graphs(&pred, &truth).unwrap_err();
        assert!(matches!(
            err,
            EvalError::UndefinedScore {
                metric: "precision"
            }
        ));
    }

    #[test]
    fn test_perfect_ranking_auc() {
        let labels = arr1(&[1.0, 1.0, 0.0, 0.0]);
        let scores = arr1(&[0.9, 0.8, 0.2, 0.1]);
        assert_eq!(roc_auc_score(&labels, &scores, 1.0).unwrap(), 1.0);
    }

    #[test]
    fn test_inverted_ranking_auc() {
        let labels = arr1(&[0.0, 0.0, 1.0, 1.0]);
        let scores = arr1(&[0.9, 0.8, 0.2, 0.1]);
        assert_eq!(roc_auc_score(&labels, &scores, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_uninformative_scores_auc() {
        let labels = arr1(&[1.0, 0.0, 1.0, 0.0]);
        let scores = arr1(&[0.5, 0.5, 0.5, 0.5]);
        // a single tied threshold yields the chance diagonal
        assert!((roc_auc_score(&labels, &scores, 1.0).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_auc_is_domain_error() {
        let labels = arr1(&[1.0, 1.0]);
        let scores = arr1(&[0.9, 0.1]);
        let err = roc_auc_score(&labels, &scores, 1.0).unwrap_err();
        assert!(matches!(err, EvalError::UndefinedScore { metric: "auc" }));
    }

    #[test]
    fn test_evaluate_explanation_end_to_end() {
        // house at 0..5 with one background edge; perfect scores on the
        // motif edges should give perfect metrics
        let pairs = [(0, 1), (1, 2), (2, 3), (3, 0), (4, 0), (4, 1), (3, 5)];
        let edge_index = EdgeIndex::from_undirected_pairs(&pairs);
        let gt = crate::ground_truth::GroundTruth::new(crate::ground_truth::DatasetVariant::Syn1);
        let truth = gt.ground_truth(2, &edge_index, 6).unwrap();

        let edge_scores = truth.edge_mask.mapv(|x| if x == 1.0 { 0.9 } else { 0.1 });
        let report = evaluate_explanation(&truth, &edge_index, &edge_scores, 12, false).unwrap();
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
        assert_eq!(report.f1, 1.0);
        assert_eq!(report.ged, 0.0);
        assert_eq!(report.auc, 1.0);
    }
}
