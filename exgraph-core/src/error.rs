//! Error types for the core data model.

use thiserror::Error;

/// Errors in core graph/mask/motif operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("edge index length mismatch: {rows} row endpoints vs {cols} col endpoints")]
    EdgeLengthMismatch { rows: usize, cols: usize },
    #[error("mask length mismatch: expected {expected}, got {actual}")]
    MaskLength { expected: usize, actual: usize },
    #[error("node id {node} out of range for mask of length {len}")]
    NodeOutOfRange { node: usize, len: usize },
    #[error("unsupported motif name: {0} (expected house, grid, cycle or bottle)")]
    UnknownMotif(String),
    #[error("invalid motif parameter: {0}")]
    InvalidMotif(String),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
