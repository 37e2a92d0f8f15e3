//! Flow graph types.

use serde::{Deserialize, Serialize};

use crate::adapter::TransactionMeta;
use crate::config::AnalysisConfig;
use crate::model::{OperationRecord, Value};

/// Characters of an address kept in `short_address`.
const SHORT_ADDRESS_LEN: usize = 12;

/// Heuristic that produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    CallDepth,
    StateDependency,
    TokenOperation,
    FeePayer,
    CallData,
    Sequence,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::CallDepth => "call_depth",
            EdgeKind::StateDependency => "state_dependency",
            EdgeKind::TokenOperation => "token_operation",
            EdgeKind::FeePayer => "fee_payer",
            EdgeKind::CallData => "call_data",
            EdgeKind::Sequence => "sequence",
        }
    }

    /// Short human label attached to edges of this kind.
    pub fn label(&self) -> &'static str {
        match self {
            EdgeKind::CallDepth => "calls (depth)",
            EdgeKind::StateDependency => "state dep",
            EdgeKind::TokenOperation => "token op",
            EdgeKind::FeePayer => "initiates",
            EdgeKind::CallData => "calls (data)",
            EdgeKind::Sequence => "sequence",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One directed relationship between two processed operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub label: String,
    #[serde(default)]
    pub failed: bool,
}

impl FlowEdge {
    pub fn new(kind: EdgeKind, from: &ProcessedOperation, to: &ProcessedOperation) -> Self {
        Self {
            from: from.node_id.clone(),
            to: to.node_id.clone(),
            kind,
            label: kind.label().to_string(),
            failed: false,
        }
    }
}

/// An operation prepared for flow analysis.
///
/// Nodes are addressed by list position (`au-{index}`), not by operation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedOperation {
    pub node_id: String,
    pub operation_id: String,
    pub index: usize,
    pub address: String,
    pub short_address: String,
    pub is_contract: bool,
    pub call_depth: u32,
    pub resource_id: String,
    pub token_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_change: Option<i128>,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub is_root_failure: bool,
    /// Every app-state slot rendered as text; empty slots read `"0"`
    pub state_values: Vec<String>,
    /// Present only when the call data is non-empty and not `"0"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_data: Option<String>,
}

impl ProcessedOperation {
    pub fn from_operation(op: &OperationRecord, index: usize, cfg: &AnalysisConfig) -> Self {
        let address = op.public_key().unwrap_or_default().to_string();
        let short_address = format!(
            "{}...",
            address.chars().take(SHORT_ADDRESS_LEN).collect::<String>()
        );
        let is_zkapp = op
            .body
            .get("isZkappAccount")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let token_symbol = match op.token_symbol() {
            Some(symbol) => symbol.to_string(),
            None if cfg.is_default_resource(&op.resource_id) => cfg.native_token_symbol.clone(),
            None => "Custom".to_string(),
        };

        Self {
            node_id: format!("au-{}", index),
            operation_id: op.id.clone(),
            index,
            address,
            short_address,
            is_contract: is_zkapp || op.has_verification_key(),
            call_depth: op.call_depth,
            resource_id: op.resource_id.clone(),
            token_symbol,
            balance_change: op.balance_change(),
            failed: op.failed,
            failure_reason: op.failure_reason.clone(),
            is_root_failure: false,
            state_values: op
                .app_state()
                .iter()
                .map(|v| if v.is_null() { "0".to_string() } else { v.display_text() })
                .collect(),
            call_data: op
                .call_data()
                .filter(|d| !d.is_empty() && *d != "0")
                .map(str::to_string),
        }
    }

    /// Process a whole list, flagging the first failed node as the root failure.
    pub fn from_operations(ops: &[OperationRecord], cfg: &AnalysisConfig) -> Vec<Self> {
        let mut nodes: Vec<Self> = ops
            .iter()
            .enumerate()
            .map(|(i, op)| Self::from_operation(op, i, cfg))
            .collect();
        if let Some(root) = nodes.iter_mut().find(|n| n.failed) {
            root.is_root_failure = true;
        }
        nodes
    }
}

/// Complete flow analysis of one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub metadata: TransactionMeta,
    pub nodes: Vec<ProcessedOperation>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    /// Edges of one kind, in merged order.
    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &FlowEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Look up a node by its `au-{index}` id.
    pub fn node(&self, node_id: &str) -> Option<&ProcessedOperation> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }
}
