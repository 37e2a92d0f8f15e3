//! Autrace Core - transaction evolution and relationship inference
//!
//! This crate provides the in-memory analysis kernel for account-update
//! transactions, including:
//! - A tagged value model and canonical operation records
//! - Structural diffing of operation lists into path-addressed change logs
//! - Call-depth hierarchy inference with same-resource orphan linking
//! - Multi-heuristic flow graph construction with priority-ordered merging
//! - Canonicalization of block-explorer transaction payloads
//! - Transaction summaries (authorization counts, fees, balance states)
//!
//! Nothing in this crate performs I/O. Orchestration across snapshots lives
//! in `autrace-engine`.

pub mod adapter;
pub mod config;
pub mod diff;
pub mod errors;
pub mod flow;
pub mod hierarchy;
pub mod logging_facility;
pub mod model;
pub mod summary;

// Re-export commonly used types
pub use adapter::{canonicalize, CanonicalTransaction, TransactionMeta};
pub use config::AnalysisConfig;
pub use diff::{compute_diff, ChangeLog};
pub use errors::{AutraceError, ExError, ExErrorKind, Result};
pub use flow::{build_flow_graph, EdgeKind, FlowEdge, FlowGraph, ProcessedOperation};
pub use hierarchy::{HierarchyEngine, Relationship};
pub use model::{AuthorizationKind, OperationRecord, Phase, Value};
pub use summary::TransactionSummary;
