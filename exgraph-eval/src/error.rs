//! Error types for explanation evaluation.

use exgraph_core::CoreError;
use thiserror::Error;

/// Errors in ground-truth resolution and scoring
#[derive(Error, Debug)]
pub enum EvalError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("unsupported dataset variant: {0} (expected syn1..syn6 or ba_shapes)")]
    UnknownDataset(String),
    #[error("node {node} lies outside the planted-motif region (starts at {region_start}); ground truth is undefined for background nodes")]
    BackgroundNode { node: usize, region_start: usize },
    #[error("{metric} is undefined: both operands of the ratio are zero")]
    UndefinedScore { metric: &'static str },
    #[error("edge scores length {actual} does not match edge index length {expected}")]
    ScoreLength { expected: usize, actual: usize },
    #[error("graph with {nodes} nodes exceeds the edit-distance bound of {max} (exact GED is exponential; only motif-scale graphs are supported)")]
    GraphTooLarge { nodes: usize, max: usize },
}

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;
