//! Per-run orchestration of canonicalization, hierarchy inference, flow
//! graphs, summaries and snapshots.

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value as Json;

use autrace_core::errors::ExError;
use autrace_core::hierarchy::{HierarchyNode, RelationshipEdge};
use autrace_core::{
    build_flow_graph, canonicalize, AnalysisConfig, CanonicalTransaction, FlowEdge, FlowGraph,
    HierarchyEngine, OperationRecord, Phase, Relationship, TransactionSummary,
};
use autrace_core_types::RunId;

use crate::history::{SnapshotHistory, TransactionSnapshot};

/// Everything derived from one analyzed transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionState {
    pub run_id: RunId,
    pub summary: TransactionSummary,
    /// Relationships in processing order
    pub relationships: Vec<Relationship>,
    pub edges: Vec<RelationshipEdge>,
    pub hierarchy: Vec<HierarchyNode>,
    pub flow: FlowGraph,
}

/// Analysis engine for one run.
///
/// Holds its own hierarchy engine and snapshot history; nothing is shared
/// across instances. Use one analyzer per concurrently analyzed transaction,
/// or call [`reset`](Self::reset) between transactions.
#[derive(Debug, Clone)]
pub struct TransactionAnalyzer {
    run_id: RunId,
    cfg: AnalysisConfig,
    hierarchy: HierarchyEngine,
    history: SnapshotHistory,
    states: Vec<TransactionState>,
}

impl Default for TransactionAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl TransactionAnalyzer {
    pub fn new(cfg: AnalysisConfig) -> Self {
        Self {
            run_id: RunId::new(),
            hierarchy: HierarchyEngine::new(&cfg),
            history: SnapshotHistory::new(cfg.clone()),
            cfg,
            states: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.cfg
    }

    /// Analyze a raw transaction payload.
    ///
    /// Malformed payloads analyze as an empty transaction.
    pub fn analyze(&mut self, raw: &Json) -> TransactionState {
        let tx = canonicalize(raw, &self.cfg);
        self.analyze_transaction(&tx)
    }

    /// Analyze an already canonical transaction and append the result to the
    /// state history.
    pub fn analyze_transaction(&mut self, tx: &CanonicalTransaction) -> TransactionState {
        let start = Instant::now();
        autrace_core::log_op_start!(
            "analyze_transaction",
            run_id = self.run_id.as_str(),
            operation_count = tx.account_updates.len()
        );

        self.hierarchy.reset();
        self.hierarchy.process_all(&tx.account_updates);

        let state = TransactionState {
            run_id: self.run_id.clone(),
            summary: TransactionSummary::from_operations(&tx.account_updates),
            relationships: self.hierarchy.ordered_relationships(),
            edges: self.hierarchy.relationship_edges(),
            hierarchy: self.hierarchy.hierarchical_view(),
            flow: FlowGraph::from_transaction(tx, &self.cfg),
        };
        self.states.push(state.clone());

        let duration_ms = start.elapsed().as_millis() as u64;
        autrace_core::log_op_end!(
            "analyze_transaction",
            duration_ms = duration_ms,
            run_id = self.run_id.as_str(),
            edge_count = state.flow.edges.len()
        );
        state
    }

    /// Canonicalize `raw` and capture it as a snapshot at `phase`.
    ///
    /// # Errors
    ///
    /// - `UnknownPhase`: `phase` is not one of deploy, prove, sign, send
    pub fn take_snapshot(&mut self, raw: &Json, phase: &str) -> Result<TransactionSnapshot, ExError> {
        let start = Instant::now();
        autrace_core::log_op_start!("take_snapshot", run_id = self.run_id.as_str(), phase = phase);

        let parsed = match phase.parse::<Phase>() {
            Ok(p) => p,
            Err(e) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                autrace_core::log_op_error!("take_snapshot", e.clone(), duration_ms = duration_ms);
                return Err(ExError::from(e).with_op("take_snapshot"));
            }
        };

        let tx = canonicalize(raw, &self.cfg);
        let snapshot = self.history.take_snapshot(tx.account_updates, parsed).clone();

        let duration_ms = start.elapsed().as_millis() as u64;
        autrace_core::log_op_end!(
            "take_snapshot",
            duration_ms = duration_ms,
            run_id = self.run_id.as_str(),
            snapshot_count = self.history.len()
        );
        Ok(snapshot)
    }

    /// Capture already canonical operations as a snapshot at `phase`.
    pub fn take_snapshot_of(&mut self, ops: Vec<OperationRecord>, phase: Phase) -> TransactionSnapshot {
        self.history.take_snapshot(ops, phase).clone()
    }

    /// Relationships of the last analyzed transaction, orphans resolved.
    pub fn relationships(&mut self) -> &HashMap<String, Relationship> {
        self.hierarchy.relationships()
    }

    /// Infer flow edges for `ops` with no declared initiator.
    pub fn build_flow_graph(&self, ops: &[OperationRecord]) -> Vec<FlowEdge> {
        let start = Instant::now();
        autrace_core::log_op_start!(
            "build_flow_graph",
            run_id = self.run_id.as_str(),
            operation_count = ops.len()
        );
        let edges = build_flow_graph(ops, None, &self.cfg);
        let duration_ms = start.elapsed().as_millis() as u64;
        autrace_core::log_op_end!(
            "build_flow_graph",
            duration_ms = duration_ms,
            edge_count = edges.len()
        );
        edges
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Every state produced by [`analyze`](Self::analyze), oldest first.
    pub fn state_history(&self) -> &[TransactionState] {
        &self.states
    }

    /// Clear hierarchy state, snapshots and state history.
    ///
    /// The run id is kept.
    pub fn reset(&mut self) {
        self.hierarchy.reset();
        self.history.clear();
        self.states.clear();
        tracing::debug!(run_id = %self.run_id, "analyzer reset");
    }
}
