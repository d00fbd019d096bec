//! A small two-layer graph convolutional network over ndarray.
//!
//! Message passing uses the symmetric-normalized adjacency with self loops;
//! gradients are written out by hand (the model is two matmuls deep) and
//! parameters are updated with Adam. Edge weights are optional so that
//! soft explanation masks can be pushed through the same forward pass.

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

use exgraph_core::{EdgeIndex, EdgeMask};

use crate::error::{TrainError, TrainResult};
use crate::io::{load_framed, save_framed};
use crate::synthetic::SynData;

/// Magic bytes identifying model checkpoints.
const CKPT_MAGIC: &[u8; 4] = b"EXGC";

const ADAM_BETA1: f32 = 0.9;
const ADAM_BETA2: f32 = 0.999;
const ADAM_EPS: f32 = 1e-8;

// ============================================================================
// Configuration
// ============================================================================

/// GCN architecture and optimization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcnConfig {
    pub hidden_dim: usize,
    pub num_epochs: usize,
    pub learning_rate: f32,
    pub weight_decay: f32,
    pub seed: u64,
}

impl Default for GcnConfig {
    fn default() -> Self {
        Self {
            hidden_dim: 20,
            num_epochs: 1000,
            learning_rate: 0.001,
            weight_decay: 0.005,
            seed: 41,
        }
    }
}

// ============================================================================
// Normalized Adjacency
// ============================================================================

/// Sparse entries `(src, dst, coeff)` of the symmetric-normalized adjacency
/// with self loops, optionally weighted per edge.
fn normalized_adjacency(
    edge_index: &EdgeIndex,
    num_nodes: usize,
    edge_weights: Option<&EdgeMask>,
) -> Vec<(usize, usize, f32)> {
    // self loop contributes 1 to every degree
    let mut deg = vec![1.0f32; num_nodes];
    for (i, (_, v)) in edge_index.iter().enumerate() {
        let w = edge_weights.map_or(1.0, |m| m[i]);
        deg[v] += w;
    }

    let mut entries = Vec::with_capacity(edge_index.len() + num_nodes);
    for (i, (u, v)) in edge_index.iter().enumerate() {
        let w = edge_weights.map_or(1.0, |m| m[i]);
        if w != 0.0 {
            entries.push((u, v, w / (deg[u].sqrt() * deg[v].sqrt())));
        }
    }
    for i in 0..num_nodes {
        entries.push((i, i, 1.0 / deg[i]));
    }
    entries
}

/// y[dst] += coeff * x[src]
fn aggregate(entries: &[(usize, usize, f32)], x: &Array2<f32>) -> Array2<f32> {
    let mut y = Array2::zeros(x.raw_dim());
    for &(u, v, c) in entries {
        let row = x.row(u).to_owned() * c;
        let mut out = y.row_mut(v);
        out += &row;
    }
    y
}

/// Transposed aggregation: y[src] += coeff * x[dst]
fn aggregate_rev(entries: &[(usize, usize, f32)], x: &Array2<f32>) -> Array2<f32> {
    let mut y = Array2::zeros(x.raw_dim());
    for &(u, v, c) in entries {
        let row = x.row(v).to_owned() * c;
        let mut out = y.row_mut(u);
        out += &row;
    }
    y
}

fn softmax_rows(logits: &Array2<f32>) -> Array2<f32> {
    let mut probs = logits.clone();
    for mut row in probs.axis_iter_mut(Axis(0)) {
        let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        row.mapv_inplace(|x| (x - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|x| x / sum);
    }
    probs
}

/// Row-wise argmax of a probability matrix.
pub fn argmax_rows(probs: &Array2<f32>) -> Vec<usize> {
    probs
        .axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(i, _)| i)
                .unwrap_or(0)
        })
        .collect()
}

// ============================================================================
// Model
// ============================================================================

/// Two-layer GCN for node classification.
#[derive(Debug, Clone)]
pub struct Gcn {
    pub config: GcnConfig,
    w1: Array2<f32>,
    w2: Array2<f32>,
}

struct ForwardCache {
    ax: Array2<f32>,
    z1: Array2<f32>,
    ah1: Array2<f32>,
    probs: Array2<f32>,
}

impl Gcn {
    /// Fresh model with Xavier-uniform weights.
    pub fn new(config: GcnConfig, input_dim: usize, num_classes: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let w1 = xavier(&mut rng, input_dim, config.hidden_dim);
        let w2 = xavier(&mut rng, config.hidden_dim, num_classes);
        Self { config, w1, w2 }
    }

    /// Class probabilities per node on the unweighted graph.
    pub fn predict(&self, x: &Array2<f32>, edge_index: &EdgeIndex) -> Array2<f32> {
        self.forward(x, edge_index, None).probs
    }

    /// Class probabilities with per-edge weights (soft or hard masks).
    pub fn predict_weighted(
        &self,
        x: &Array2<f32>,
        edge_index: &EdgeIndex,
        edge_weights: &EdgeMask,
    ) -> Array2<f32> {
        self.forward(x, edge_index, Some(edge_weights)).probs
    }

    fn forward(
        &self,
        x: &Array2<f32>,
        edge_index: &EdgeIndex,
        edge_weights: Option<&EdgeMask>,
    ) -> ForwardCache {
        let entries = normalized_adjacency(edge_index, x.nrows(), edge_weights);
        let ax = aggregate(&entries, x);
        let z1 = ax.dot(&self.w1);
        let h1 = z1.mapv(|v| v.max(0.0));
        let ah1 = aggregate(&entries, &h1);
        let logits = ah1.dot(&self.w2);
        let probs = softmax_rows(&logits);
        ForwardCache { ax, z1, ah1, probs }
    }

    /// Fraction of correctly classified nodes under `mask`.
    pub fn accuracy(&self, data: &SynData, mask: &[bool]) -> f64 {
        let probs = self.predict(&data.x, &data.edge_index);
        let pred = argmax_rows(&probs);
        let mut correct = 0usize;
        let mut total = 0usize;
        for i in 0..data.num_nodes() {
            if mask[i] {
                total += 1;
                if pred[i] == data.y[i] {
                    correct += 1;
                }
            }
        }
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Full-batch training with cross-entropy over the train split.
    pub fn train(&mut self, data: &SynData) -> TrainResult<TrainHistory> {
        let n_train = data.train_mask.iter().filter(|&&t| t).count();
        if n_train == 0 {
            return Err(TrainError::InvalidConfig(
                "training split is empty".to_string(),
            ));
        }

        let entries = normalized_adjacency(&data.edge_index, data.num_nodes(), None);
        let mut adam1 = Adam::new(self.w1.raw_dim());
        let mut adam2 = Adam::new(self.w2.raw_dim());
        let lr = self.config.learning_rate;
        let wd = self.config.weight_decay;
        let mut losses = Vec::with_capacity(self.config.num_epochs);

        for _ in 0..self.config.num_epochs {
            let ax = aggregate(&entries, &data.x);
            let z1 = ax.dot(&self.w1);
            let h1 = z1.mapv(|v| v.max(0.0));
            let ah1 = aggregate(&entries, &h1);
            let logits = ah1.dot(&self.w2);
            let probs = softmax_rows(&logits);

            // cross-entropy over the train split
            let mut loss = 0.0f32;
            let mut dz2 = probs.clone();
            for i in 0..data.num_nodes() {
                if data.train_mask[i] {
                    loss -= probs[[i, data.y[i]]].max(1e-12).ln();
                    dz2[[i, data.y[i]]] -= 1.0;
                } else {
                    dz2.row_mut(i).fill(0.0);
                }
            }
            loss /= n_train as f32;
            loss += 0.5 * wd * (self.w1.mapv(|v| v * v).sum() + self.w2.mapv(|v| v * v).sum());
            losses.push(loss);
            dz2.mapv_inplace(|v| v / n_train as f32);

            let dw2 = ah1.t().dot(&dz2) + &(self.w2.mapv(|v| v * wd));
            let dah1 = dz2.dot(&self.w2.t());
            let dh1 = aggregate_rev(&entries, &dah1);
            let dz1 = &dh1 * &z1.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
            let dw1 = ax.t().dot(&dz1) + &(self.w1.mapv(|v| v * wd));

            adam1.step(&mut self.w1, &dw1, lr);
            adam2.step(&mut self.w2, &dw2, lr);
        }

        Ok(TrainHistory {
            losses,
            train_acc: self.accuracy(data, &data.train_mask),
            test_acc: self.accuracy(data, &data.test_mask),
        })
    }

    // ========================================================================
    // Checkpoints
    // ========================================================================

    /// Save weights plus the recorded test accuracy.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P, acc: f64) -> TrainResult<()> {
        let ckpt = Checkpoint {
            model_type: "gcn".to_string(),
            acc,
            config: self.config.clone(),
            w1: self.w1.clone(),
            w2: self.w2.clone(),
        };
        save_framed(path, CKPT_MAGIC, &ckpt)
    }

    /// Load a checkpoint; a missing file is an explicit error telling the
    /// caller to retrain, never a silent fallback.
    pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> TrainResult<(Self, f64)> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TrainError::CheckpointNotFound {
                path: path.display().to_string(),
            });
        }
        let ckpt: Checkpoint = load_framed(path, CKPT_MAGIC)?;
        Ok((
            Self {
                config: ckpt.config,
                w1: ckpt.w1,
                w2: ckpt.w2,
            },
            ckpt.acc,
        ))
    }
}

/// Serialized model state.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Checkpoint {
    model_type: String,
    acc: f64,
    config: GcnConfig,
    w1: Array2<f32>,
    w2: Array2<f32>,
}

/// Per-epoch losses and final split accuracies.
#[derive(Debug, Clone)]
pub struct TrainHistory {
    pub losses: Vec<f32>,
    pub train_acc: f64,
    pub test_acc: f64,
}

fn xavier(rng: &mut StdRng, fan_in: usize, fan_out: usize) -> Array2<f32> {
    let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
    Array2::from_shape_fn((fan_in, fan_out), |_| rng.gen_range(-limit..limit))
}

// ============================================================================
// Adam Optimizer
// ============================================================================

struct Adam {
    m: Array2<f32>,
    v: Array2<f32>,
    t: i32,
}

impl Adam {
    fn new(dim: ndarray::Ix2) -> Self {
        Self {
            m: Array2::zeros(dim),
            v: Array2::zeros(dim),
            t: 0,
        }
    }

    fn step(&mut self, w: &mut Array2<f32>, grad: &Array2<f32>, lr: f32) {
        self.t += 1;
        self.m = &self.m * ADAM_BETA1 + &(grad * (1.0 - ADAM_BETA1));
        self.v = &self.v * ADAM_BETA2 + &(grad.mapv(|g| g * g) * (1.0 - ADAM_BETA2));
        let m_hat = &self.m / (1.0 - ADAM_BETA1.powi(self.t));
        let v_hat = &self.v / (1.0 - ADAM_BETA2.powi(self.t));
        *w -= &(m_hat / (v_hat.mapv(f32::sqrt) + ADAM_EPS) * lr);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{build_synthetic, SyntheticConfig};
    use exgraph_eval::DatasetVariant;
    use ndarray::Array1;

    fn tiny_data() -> SynData {
        build_synthetic(&SyntheticConfig {
            variant: DatasetVariant::BaShapes,
            num_basis: 30,
            num_shapes: 6,
            attach_edges: 3,
            feature_dim: 4,
            train_ratio: 0.8,
            seed: 41,
        })
        .unwrap()
    }

    #[test]
    fn test_predict_shapes_and_normalization() {
        let data = tiny_data();
        let model = Gcn::new(GcnConfig::default(), 4, data.num_classes);
        let probs = model.predict(&data.x, &data.edge_index);
        assert_eq!(probs.nrows(), data.num_nodes());
        assert_eq!(probs.ncols(), data.num_classes);
        for row in probs.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_zero_weights_disconnect_graph() {
        let data = tiny_data();
        let model = Gcn::new(GcnConfig::default(), 4, data.num_classes);
        let zeros = Array1::zeros(data.edge_index.len());
        let probs = model.predict_weighted(&data.x, &data.edge_index, &zeros);
        // identical features with no message passing give identical rows
        let first = probs.row(0).to_owned();
        for row in probs.axis_iter(Axis(0)) {
            assert!(row
                .iter()
                .zip(first.iter())
                .all(|(a, b)| (a - b).abs() < 1e-6));
        }
    }

    #[test]
    fn test_training_reduces_loss() {
        let data = tiny_data();
        let mut model = Gcn::new(
            GcnConfig {
                num_epochs: 100,
                ..Default::default()
            },
            4,
            data.num_classes,
        );
        let history = model.train(&data).unwrap();
        assert_eq!(history.losses.len(), 100);
        assert!(history.losses.iter().all(|l| l.is_finite()));
        assert!(history.losses.last().unwrap() < history.losses.first().unwrap());
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gcn.ckpt");
        let data = tiny_data();
        let model = Gcn::new(GcnConfig::default(), 4, data.num_classes);
        model.save_checkpoint(&path, 0.9).unwrap();

        let (loaded, acc) = Gcn::load_checkpoint(&path).unwrap();
        assert_eq!(acc, 0.9);
        let a = model.predict(&data.x, &data.edge_index);
        let b = loaded.predict(&data.x, &data.edge_index);
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_checkpoint_is_explicit() {
        let err = Gcn::load_checkpoint("/nonexistent/gcn.ckpt").unwrap_err();
        assert!(matches!(err, TrainError::CheckpointNotFound { .. }));
    }
}
