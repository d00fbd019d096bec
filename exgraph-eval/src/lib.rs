//! # exgraph-eval
//!
//! Scoring of GNN explanations against planted-motif ground truth.
//!
//! The pipeline evaluated here: a ground-truth resolver recovers the motif
//! instance a queried node belongs to by pure modular arithmetic, an
//! extractor turns a learned edge-importance vector into a predicted
//! explanation subgraph, and the scorer compares the two by edge-set
//! intersection (precision / recall / F1), exact graph edit distance and
//! ROC-AUC over the edge mask. A fidelity evaluator aggregates how much
//! model predictions survive when only the important edges are kept.

pub mod error;
pub mod explanation;
pub mod fidelity;
pub mod ged;
pub mod ground_truth;
pub mod scoring;

pub use error::{EvalError, EvalResult};
pub use explanation::extract_explanation;
pub use fidelity::{eval_fidelity, FidelityParams, FidelityScores, ProbabilitySummary, RelatedPreds};
pub use ged::graph_edit_distance;
pub use ground_truth::{DatasetVariant, GroundTruth, GroundTruthExplanation, MotifInstance};
pub use scoring::{evaluate_explanation, roc_auc_score, roc_curve, score_graphs, GraphScores, RocCurve, ScoreReport};
