//! Per-transaction summary: authorization counts, fees, node kinds and
//! running balances.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{AuthorizationKind, OperationRecord};

/// Label fragments that mark an operation as contract-driven.
const CONTRACT_LABEL_HINTS: &[&str] = &["contract", "zkapp", "deploy"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Account,
    Contract,
}

impl NodeKind {
    /// Classify an operation.
    ///
    /// Contract if the label mentions a contract hint, the update carries
    /// verification-key data, or the operation is proof-authorized.
    pub fn classify(op: &OperationRecord) -> Self {
        let label = op.label.to_lowercase();
        if CONTRACT_LABEL_HINTS.iter().any(|hint| label.contains(hint))
            || op.has_verification_key()
            || op.authorization_kind == AuthorizationKind::Proof
        {
            NodeKind::Contract
        } else {
            NodeKind::Account
        }
    }
}

/// One distinct operation of the transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    pub resource_id: String,
    pub call_depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_symbol: Option<String>,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl NodeInfo {
    fn from_operation(op: &OperationRecord) -> Self {
        Self {
            id: op.id.clone(),
            kind: NodeKind::classify(op),
            label: op.label.clone(),
            public_key: op.public_key().map(str::to_string),
            resource_id: op.resource_id.clone(),
            call_depth: op.call_depth,
            token_symbol: op.token_symbol().map(str::to_string),
            failed: op.failed,
            failure_reason: op.failure_reason.clone(),
        }
    }
}

/// Aggregate view of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub account_updates: usize,
    pub total_proofs: usize,
    pub total_signatures: usize,
    /// Sum of the magnitudes of all negative balance changes, in nanomina
    pub total_fees: i128,
    /// Distinct operations in first-seen order
    pub nodes: Vec<NodeInfo>,
    /// Running balance per operation id, starting at zero
    pub balance_states: BTreeMap<String, Vec<i128>>,
}

impl TransactionSummary {
    pub fn from_operations(ops: &[OperationRecord]) -> Self {
        let mut summary = TransactionSummary {
            account_updates: ops.len(),
            ..Default::default()
        };

        for op in ops {
            match op.authorization_kind {
                AuthorizationKind::Proof => summary.total_proofs += 1,
                AuthorizationKind::Signature => summary.total_signatures += 1,
                AuthorizationKind::None => {}
            }

            let change = op.balance_change().unwrap_or(0);
            if change < 0 {
                summary.total_fees = summary.total_fees.saturating_add(change.saturating_neg());
            }

            if !summary.nodes.iter().any(|n| n.id == op.id) {
                summary.nodes.push(NodeInfo::from_operation(op));
            }

            let states = summary
                .balance_states
                .entry(op.id.clone())
                .or_insert_with(|| vec![0]);
            let last = states.last().copied().unwrap_or(0);
            states.push(last.saturating_add(change));
        }

        summary
    }

    pub fn node(&self, id: &str) -> Option<&NodeInfo> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
