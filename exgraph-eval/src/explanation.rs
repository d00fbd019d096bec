//! Turning learned edge-importance scores into an explanation subgraph.

use exgraph_core::{EdgeIndex, EdgeMask, Subgraph};

use crate::error::{EvalError, EvalResult};

/// Select the explanation subgraph implied by an edge-importance vector.
///
/// With `hard_mask` set, every edge whose score equals exactly 1 is kept
/// (the scores are already a 0/1 mask; no ranking happens). Otherwise the
/// `num_top_edges` highest-scoring edges are kept, ties broken by original
/// edge order (stable), with the count clamped to the number of edges.
///
/// The resulting graph contains every node that appears as an endpoint of a
/// selected edge; isolated nodes are not retained.
pub fn extract_explanation(
    edge_index: &EdgeIndex,
    edge_scores: &EdgeMask,
    num_top_edges: usize,
    hard_mask: bool,
) -> EvalResult<Subgraph> {
    if edge_scores.len() != edge_index.len() {
        return Err(EvalError::ScoreLength {
            expected: edge_index.len(),
            actual: edge_scores.len(),
        });
    }

    let selected: Vec<usize> = if hard_mask {
        (0..edge_index.len())
            .filter(|&i| edge_scores[i] == 1.0)
            .collect()
    } else {
        let mut order: Vec<usize> = (0..edge_index.len()).collect();
        // sort_by is stable, so equal scores keep original edge order
        order.sort_by(|&a, &b| {
            edge_scores[b]
                .partial_cmp(&edge_scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order.truncate(num_top_edges.min(edge_index.len()));
        order
    };

    let mut graph = Subgraph::new();
    for i in selected {
        let (u, v) = edge_index.endpoints(i);
        graph.add_edge(u, v, ());
    }
    Ok(graph)
}

// ============================================================================
// Tests
// ============================================================================
