//! # exgraph-train
//!
//! The experiment side of explanation evaluation: synthetic
//! planted-motif datasets, a small GCN node classifier, edge-importance
//! explainers and the persistence needed to make runs resumable.
//!
//! The `explain_experiment` binary ties it together: build or load a
//! dataset, train or load the classifier, compute or reload explanation
//! masks, then score them against ground truth with `exgraph-eval`.

pub mod error;
pub mod explainers;
pub mod gcn;
pub mod io;
pub mod masks;
pub mod synthetic;

pub use error::{TrainError, TrainResult};
pub use explainers::{eval_related_pred, split_mask, ExplainerKind};
pub use gcn::{argmax_rows, Gcn, GcnConfig, TrainHistory};
pub use masks::{MaskEntry, MaskStore};
pub use synthetic::{build_synthetic, SynData, SyntheticConfig};
