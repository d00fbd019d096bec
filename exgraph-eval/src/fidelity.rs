//! Fidelity of explanations with respect to model predictions.
//!
//! Three prediction conditions are compared per queried node: the original
//! graph, the graph with only the important edges kept ("masked"), and the
//! graph with the important edges removed ("maskout"). A faithful
//! explanation keeps the target-class probability high under "masked" and
//! collapses it under "maskout". This module is purely numeric
//! aggregation; producing the three prediction matrices is the model
//! layer's concern.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

// ============================================================================
// Parameters
// ============================================================================

/// Mask-application parameters a fidelity run is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FidelityParams {
    /// Fraction of edges treated as unimportant (0.7 keeps the top 30%).
    pub sparsity: f64,
    /// Whether edge scores were min-max normalized before thresholding.
    pub normalize: bool,
    /// Hard 0/1 masking versus soft score-weighted masking.
    pub hard_mask: bool,
}

impl Default for FidelityParams {
    fn default() -> Self {
        Self {
            sparsity: 0.7,
            normalize: true,
            hard_mask: true,
        }
    }
}

// ============================================================================
// Related Predictions
// ============================================================================

/// Class-probability rows for every queried node under the three masking
/// conditions, plus the labels involved.
#[derive(Debug, Clone)]
pub struct RelatedPreds {
    /// Queried node ids, one per row.
    pub node_idx: Vec<usize>,
    /// Ground-truth class per node.
    pub true_label: Vec<usize>,
    /// Model's predicted class per node on the original graph.
    pub pred_label: Vec<usize>,
    /// Probabilities on the unmasked graph, row per node.
    pub origin: Array2<f32>,
    /// Probabilities with only important edges kept.
    pub masked: Array2<f32>,
    /// Probabilities with important edges removed.
    pub maskout: Array2<f32>,
}

impl RelatedPreds {
    /// Probability assigned to each node's target class, per condition row.
    fn target_probs(probs: &Array2<f32>, labels: &[usize]) -> EvalResult<Array1<f64>> {
        if probs.nrows() != labels.len() {
            return Err(EvalError::ScoreLength {
                expected: labels.len(),
                actual: probs.nrows(),
            });
        }
        Ok(labels
            .iter()
            .enumerate()
            .map(|(i, &label)| probs[[i, label]] as f64)
            .collect())
    }

    /// Mean target-class probability per condition.
    pub fn probability_summary(&self) -> EvalResult<ProbabilitySummary> {
        let ori = Self::target_probs(&self.origin, &self.true_label)?;
        let important = Self::target_probs(&self.masked, &self.true_label)?;
        let unimportant = Self::target_probs(&self.maskout, &self.true_label)?;
        Ok(ProbabilitySummary {
            ori_probs: mean(&ori),
            important_probs: mean(&important),
            unimportant_probs: mean(&unimportant),
        })
    }
}

/// Mean predicted probability of the target class per masking condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilitySummary {
    pub ori_probs: f64,
    pub important_probs: f64,
    pub unimportant_probs: f64,
}

// ============================================================================
// Fidelity Scores
// ============================================================================

/// Drop/retention of target-class probability across conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FidelityScores {
    /// Mean(origin - maskout): large when important edges carried the
    /// prediction.
    pub fidelity_plus: f64,
    /// Mean(origin - masked): small when the explanation alone preserves
    /// the prediction.
    pub fidelity_minus: f64,
    /// Parameters the masks were built with.
    pub params: FidelityParams,
}

/// Aggregate fidelity over all queried nodes.
pub fn eval_fidelity(preds: &RelatedPreds, params: FidelityParams) -> EvalResult<FidelityScores> {
    let ori = RelatedPreds::target_probs(&preds.origin, &preds.true_label)?;
    let masked = RelatedPreds::target_probs(&preds.masked, &preds.true_label)?;
    let maskout = RelatedPreds::target_probs(&preds.maskout, &preds.true_label)?;

    let plus: Array1<f64> = &ori - &maskout;
    let minus: Array1<f64> = &ori - &masked;
    Ok(FidelityScores {
        fidelity_plus: mean(&plus),
        fidelity_minus: mean(&minus),
        params,
    })
}

fn mean(values: &Array1<f64>) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.sum() / values.len() as f64
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn sample_preds() -> RelatedPreds {
        RelatedPreds {
            node_idx: vec![10, 11],
            true_label: vec![1, 0],
            pred_label: vec![1, 0],
            origin: arr2(&[[0.1, 0.9], [0.8, 0.2]]),
            masked: arr2(&[[0.2, 0.8], [0.7, 0.3]]),
            maskout: arr2(&[[0.9, 0.1], [0.4, 0.6]]),
        }
    }

    #[test]
    fn test_probability_summary() {
        let summary = sample_preds().probability_summary().unwrap();
        assert!((summary.ori_probs - 0.85).abs() < 1e-6);
        assert!((summary.important_probs - 0.75).abs() < 1e-6);
        assert!((summary.unimportant_probs - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_fidelity_scores() {
        let scores = eval_fidelity(&sample_preds(), FidelityParams::default()).unwrap();
        // origin 0.9/0.8, maskout 0.1/0.4 -> plus = (0.8 + 0.4) / 2
        assert!((scores.fidelity_plus - 0.6).abs() < 1e-6);
        // origin 0.9/0.8, masked 0.8/0.7 -> minus = 0.1
        assert!((scores.fidelity_minus - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_row_count_mismatch() {
        let mut preds = sample_preds();
        preds.true_label = vec![1];
        assert!(preds.probability_summary().is_err());
    }
}
