//! Autrace Engine - Orchestration layer
//!
//! Coordinates the analysis kernel across the lifecycle of one transaction:
//! snapshot history with per-phase diffs, hierarchy inference, flow graphs
//! and summaries. Operation boundaries are logged here, not in the core.

pub mod analyzer;
pub mod history;

pub use analyzer::{TransactionAnalyzer, TransactionState};
pub use history::{SnapshotHistory, TransactionSnapshot};
