//! Change-log output types.
//!
//! Entries are emitted in a deterministic order: operations in input list
//! order, keys within an operation in lexicographic path order.

use serde::{Deserialize, Serialize};

use crate::model::{OperationRecord, Value};

/// Payload of an `added`/`removed` entry.
///
/// Whole operations are recorded when an id appears on only one side; a
/// single leaf is recorded when a key path appears on only one side of a
/// matched pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeNode {
    /// One operation present on only one side
    Operation(OperationRecord),
    /// An entire side, when the other side was absent
    Operations(Vec<OperationRecord>),
    /// A leaf present on only one side of a matched pair
    Leaf { key: String, value: Value },
}

impl ChangeNode {
    /// The operation payload, if this node carries a single operation.
    pub fn as_operation(&self) -> Option<&OperationRecord> {
        match self {
            ChangeNode::Operation(op) => Some(op),
            _ => None,
        }
    }

    /// The leaf value, if this node carries a leaf.
    pub fn leaf_value(&self) -> Option<&Value> {
        match self {
            ChangeNode::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// An addition or removal at a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    pub path: String,
    pub node: ChangeNode,
}

/// A changed leaf inside a matched operation pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    /// Dotted key path relative to the operation root
    pub field: String,
    pub old_value: Value,
    /// `Null` when the new side has no value
    pub new_value: Value,
}

/// All leaf changes recorded at one path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatedEntry {
    pub path: String,
    pub changes: Vec<FieldChange>,
}

/// The `{added, removed, updated}` result of diffing two operation lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    pub added: Vec<PathEntry>,
    pub removed: Vec<PathEntry>,
    pub updated: Vec<UpdatedEntry>,
}

impl ChangeLog {
    /// True if no change of any kind was recorded.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    /// Total number of entries across all three lists.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.updated.len()
    }
}
