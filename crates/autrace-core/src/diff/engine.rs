//! Structural diff between two operation lists.
//!
//! The entry point is [`compute_diff`]. Operations are joined by `id`; each
//! matched pair is flattened to leaf paths with [`enumerate_leaves`] and the
//! two path sets are compared with immutable set algebra.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::AnalysisConfig;
use crate::diff::compare::values_equal;
use crate::diff::keys::enumerate_leaves;
use crate::diff::model::{ChangeLog, ChangeNode, FieldChange, PathEntry, UpdatedEntry};
use crate::model::{OperationRecord, Value};

/// Compute the change log from `previous` to `current`.
///
/// `None` means the side was never captured. Boundary cases:
/// - both sides absent or empty: empty log
/// - one side absent, the other non-empty: the whole populated side is one
///   `added` (or `removed`) entry at the root path
///
/// Otherwise operations present in only one list are added/removed whole at
/// `root[i]`, and matched pairs are diffed leaf by leaf. Matched and removed
/// operations use their position in `previous`; added ones use their position
/// in `current`.
pub fn compute_diff(
    previous: Option<&[OperationRecord]>,
    current: Option<&[OperationRecord]>,
    cfg: &AnalysisConfig,
) -> ChangeLog {
    let mut log = ChangeLog::default();
    let root = cfg.path_root.as_str();

    let (previous, current) = match (previous, current) {
        (None, None) => return log,
        (None, Some(cur)) => {
            if !cur.is_empty() {
                log.added.push(PathEntry {
                    path: root.to_string(),
                    node: ChangeNode::Operations(cur.to_vec()),
                });
            }
            return log;
        }
        (Some(prev), None) => {
            if !prev.is_empty() {
                log.removed.push(PathEntry {
                    path: root.to_string(),
                    node: ChangeNode::Operations(prev.to_vec()),
                });
            }
            return log;
        }
        (Some(prev), Some(cur)) => (prev, cur),
    };

    let previous_by_id: BTreeMap<&str, &OperationRecord> =
        previous.iter().map(|op| (op.id.as_str(), op)).collect();
    let current_by_id: BTreeMap<&str, &OperationRecord> =
        current.iter().map(|op| (op.id.as_str(), op)).collect();

    for (index, old) in previous.iter().enumerate() {
        let path = format!("{}[{}]", root, index);
        match current_by_id.get(old.id.as_str()) {
            None => log.removed.push(PathEntry {
                path,
                node: ChangeNode::Operation(old.clone()),
            }),
            Some(new) => diff_pair(old, new, &path, cfg, &mut log),
        }
    }

    for (index, new) in current.iter().enumerate() {
        if !previous_by_id.contains_key(new.id.as_str()) {
            log.added.push(PathEntry {
                path: format!("{}[{}]", root, index),
                node: ChangeNode::Operation(new.clone()),
            });
        }
    }

    tracing::debug!(
        previous = previous.len(),
        current = current.len(),
        added = log.added.len(),
        removed = log.removed.len(),
        updated = log.updated.len(),
        "computed operation diff"
    );

    log
}

/// Diff one matched pair of operations rooted at `path`.
fn diff_pair(
    old: &OperationRecord,
    new: &OperationRecord,
    path: &str,
    cfg: &AnalysisConfig,
    log: &mut ChangeLog,
) {
    let old_tree = old.to_tree();
    let new_tree = new.to_tree();
    let old_leaves = enumerate_leaves(&old_tree, "");
    let new_leaves = enumerate_leaves(&new_tree, "");

    let old_keys: BTreeSet<&String> = old_leaves.keys().collect();
    let new_keys: BTreeSet<&String> = new_leaves.keys().collect();

    for key in old_keys.difference(&new_keys) {
        let value = old_leaves[*key];
        if value.is_callable() {
            continue;
        }
        log.removed.push(leaf_entry(path, key, value.clone()));
    }

    for key in new_keys.difference(&old_keys) {
        let value = new_leaves[*key];
        if value.is_callable() {
            continue;
        }
        let value = truncate_proof(key, value, cfg);
        log.added.push(leaf_entry(path, key, value));
    }

    for key in old_keys.intersection(&new_keys) {
        let old_value = old_leaves[*key];
        let new_value = new_leaves[*key];
        if old_value.is_callable() || new_value.is_callable() {
            continue;
        }
        if !values_equal(old_value, new_value) {
            log.updated.push(UpdatedEntry {
                path: format!("{}.{}", path, key),
                changes: vec![FieldChange {
                    field: (*key).clone(),
                    old_value: old_value.clone(),
                    new_value: new_value.clone(),
                }],
            });
        }
    }
}

fn leaf_entry(path: &str, key: &str, value: Value) -> PathEntry {
    PathEntry {
        path: format!("{}.{}", path, key),
        node: ChangeNode::Leaf {
            key: key.to_string(),
            value,
        },
    }
}

/// Shorten string payloads under keys mentioning `proof`.
///
/// Lengths are counted in characters, so multi-byte text is never split.
fn truncate_proof(key: &str, value: &Value, cfg: &AnalysisConfig) -> Value {
    if !key.contains("proof") {
        return value.clone();
    }
    match value.as_str() {
        Some(text) if text.chars().count() > cfg.proof_truncate_len => {
            let head: String = text.chars().take(cfg.proof_truncate_len).collect();
            Value::str(format!("{}{}", head, cfg.truncation_marker))
        }
        _ => value.clone(),
    }
}
