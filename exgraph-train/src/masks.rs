//! Persistence of computed edge-importance masks.
//!
//! One store per (dataset, explainer) run, keyed by queried node id and
//! carrying the per-node runtime so summaries can report mean explanation
//! time without recomputation.

use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use exgraph_core::EdgeMask;

use crate::error::TrainResult;
use crate::io::{load_framed, save_framed};

/// Magic bytes identifying mask stores.
const MASK_MAGIC: &[u8; 4] = b"EXGM";

/// One computed mask: the queried node, its edge scores and the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskEntry {
    pub node_idx: usize,
    pub edge_scores: Vec<f32>,
    pub runtime_secs: f64,
}

/// All masks computed by one explainer over one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskStore {
    pub explainer: String,
    pub entries: Vec<MaskEntry>,
}

impl MaskStore {
    pub fn new(explainer: impl Into<String>) -> Self {
        Self {
            explainer: explainer.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, node_idx: usize, edge_scores: EdgeMask, runtime_secs: f64) {
        self.entries.push(MaskEntry {
            node_idx,
            edge_scores: edge_scores.to_vec(),
            runtime_secs,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean per-node explanation runtime in seconds.
    pub fn mean_runtime(&self) -> f64 {
        if self.entries.is_empty() {
            0.0
        } else {
            self.entries.iter().map(|e| e.runtime_secs).sum::<f64>() / self.entries.len() as f64
        }
    }

    /// Masks as `(node, scores)` pairs for evaluation.
    pub fn edge_masks(&self) -> Vec<(usize, EdgeMask)> {
        self.entries
            .iter()
            .map(|e| (e.node_idx, Array1::from_vec(e.edge_scores.clone())))
            .collect()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> TrainResult<()> {
        save_framed(path, MASK_MAGIC, self)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> TrainResult<Self> {
        load_framed(path, MASK_MAGIC)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("masks_random.bin");

        let mut store = MaskStore::new("random");
        store.push(31, arr1(&[0.9, 0.1]), 0.5);
        store.push(36, arr1(&[0.2, 0.8]), 1.5);
        store.save(&path).unwrap();

        let loaded = MaskStore::load(&path).unwrap();
        assert_eq!(loaded.explainer, "random");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.mean_runtime(), 1.0);
        let masks = loaded.edge_masks();
        assert_eq!(masks[0].0, 31);
        assert_eq!(masks[0].1.to_vec(), vec![0.9, 0.1]);
    }
}
