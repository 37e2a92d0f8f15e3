//! Relationship records produced by hierarchy inference.

use serde::{Deserialize, Serialize};

use crate::model::OperationRecord;

/// Contract and method parsed from a `Contract.method()` label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub contract: String,
    pub name: String,
}

impl MethodInfo {
    /// Parse `Token.transfer()` into `{contract: Token, name: transfer}`.
    ///
    /// Returns `None` for labels without a `.` separator.
    pub fn from_label(label: &str) -> Option<Self> {
        let mut parts = label.split('.');
        let contract = parts.next()?;
        let method = parts.next()?;
        Some(Self {
            contract: contract.to_string(),
            name: method.replace("()", ""),
        })
    }
}

/// One populated application-state slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// `appState[i]`
    pub field: String,
    pub value: String,
}

impl StateChange {
    /// Collect slots that hold something other than null or zero.
    pub fn from_operation(op: &OperationRecord) -> Vec<Self> {
        op.app_state()
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i, v.display_text()))
            .filter(|(_, text)| text != "0")
            .map(|(i, value)| StateChange {
                field: format!("appState[{}]", i),
                value,
            })
            .collect()
    }
}

/// Parent/child record for one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub depth: u32,
    pub resource_id: String,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<MethodInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state_changes: Vec<StateChange>,
}

/// Nested tree rendering of the relationship forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<MethodInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state_changes: Vec<StateChange>,
    pub children: Vec<HierarchyNode>,
}

/// Outcome carried on a relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStatus {
    Success,
    Failed,
}

/// One parent-to-child call edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEdge {
    /// `op{sequence}`
    pub id: String,
    pub from: String,
    pub to: String,
    /// 1-based position among emitted edges
    pub sequence: usize,
    /// Method name of the child, or `update`
    pub operation_type: String,
    pub status: EdgeStatus,
    /// First state value written by the child, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_value: Option<String>,
}
