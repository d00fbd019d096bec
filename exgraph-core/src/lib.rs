//! # exgraph-core
//!
//! Shared data model for evaluating GNN explainability methods on
//! synthetic motif graphs.
//!
//! This crate provides:
//! - Undirected subgraphs over global node ids ([`Subgraph`])
//! - The GNN-facing edge list representation ([`EdgeIndex`])
//! - Node and edge masks aligned to those structures ([`NodeMask`], [`EdgeMask`])
//! - Canonical motif templates planted into synthetic graphs ([`MotifKind`])
//!
//! Everything here is deterministic: a motif template built twice from the
//! same start index is identical, and mask derivation is a pure function of
//! its inputs.

pub mod error;
pub mod graph;
pub mod mask;
pub mod motif;

pub use error::{CoreError, CoreResult};
pub use graph::{subgraph_from_edges, EdgeIndex, Subgraph};
pub use mask::{node_mask_from_members, node_mask_to_edge_mask, EdgeMask, NodeMask};
pub use motif::MotifKind;
