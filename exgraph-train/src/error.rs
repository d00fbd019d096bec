//! Error types for datasets, training and explanation runs.

use exgraph_core::CoreError;
use exgraph_eval::EvalError;
use thiserror::Error;

/// Errors in dataset building, model training and mask computation
#[derive(Error, Debug)]
pub enum TrainError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("bad file format at {path}: {detail}")]
    BadFormat { path: String, detail: String },
    #[error("checkpoint not found at {path}; train a model for this dataset first (run explain_experiment without a saved model to retrain)")]
    CheckpointNotFound { path: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported explainer name: {0} (expected occlusion, distance or random)")]
    UnknownExplainer(String),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for training operations
pub type TrainResult<T> = Result<T, TrainError>;
