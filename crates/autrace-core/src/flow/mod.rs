//! Multi-heuristic flow graph over the operations of one transaction.
//!
//! Six heuristics each propose edges; [`merge_edges`] keeps the first edge per
//! ordered node pair, in the priority order of [`heuristics::HEURISTICS`].

pub mod builder;
pub mod heuristics;
pub mod model;

pub use builder::{apply_failure_status, build_edges, build_flow_graph, merge_edges};
pub use heuristics::{FlowContext, Heuristic, HEURISTICS};
pub use model::{EdgeKind, FlowEdge, FlowGraph, ProcessedOperation};
