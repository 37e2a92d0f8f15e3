//! Append-only history of transaction snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use autrace_core::diff::compute_diff;
use autrace_core::{AnalysisConfig, ChangeLog, OperationRecord, Phase};
use autrace_core_types::SnapshotId;

/// One captured tree and its changes relative to the capture before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSnapshot {
    pub id: SnapshotId,
    #[serde(rename = "operation")]
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
    pub tree: Vec<OperationRecord>,
    pub changes: ChangeLog,
}

/// Snapshots of one transaction in capture order.
///
/// Snapshots are only ever appended. Insertion order defines which tree is
/// "previous" for the next diff.
#[derive(Debug, Clone, Default)]
pub struct SnapshotHistory {
    snapshots: Vec<TransactionSnapshot>,
    cfg: AnalysisConfig,
}

impl SnapshotHistory {
    pub fn new(cfg: AnalysisConfig) -> Self {
        Self {
            snapshots: Vec::new(),
            cfg,
        }
    }

    /// Diff `tree` against the latest stored tree, store it and return it.
    ///
    /// The first snapshot has no previous tree, so a non-empty first tree is
    /// recorded as a single whole-list addition.
    pub fn take_snapshot(
        &mut self,
        tree: Vec<OperationRecord>,
        phase: Phase,
    ) -> &TransactionSnapshot {
        let changes = compute_diff(self.current_tree(), Some(tree.as_slice()), &self.cfg);
        tracing::debug!(
            phase = %phase,
            operations = tree.len(),
            changes = changes.len(),
            "captured snapshot"
        );
        self.snapshots.push(TransactionSnapshot {
            id: SnapshotId::new(),
            phase,
            timestamp: Utc::now(),
            tree,
            changes,
        });
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn snapshots(&self) -> &[TransactionSnapshot] {
        &self.snapshots
    }

    pub fn latest(&self) -> Option<&TransactionSnapshot> {
        self.snapshots.last()
    }

    /// Tree of the latest snapshot, if any.
    pub fn current_tree(&self) -> Option<&[OperationRecord]> {
        self.latest().map(|s| s.tree.as_slice())
    }

    /// Snapshots captured at `phase`, in capture order.
    pub fn by_phase(&self, phase: Phase) -> impl Iterator<Item = &TransactionSnapshot> {
        self.snapshots.iter().filter(move |s| s.phase == phase)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop every snapshot so the history can serve a new transaction.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
