//! Heuristic merge and graph assembly.

use std::collections::HashSet;

use crate::adapter::CanonicalTransaction;
use crate::config::AnalysisConfig;
use crate::flow::heuristics::{FlowContext, HEURISTICS};
use crate::flow::model::{FlowEdge, FlowGraph, ProcessedOperation};
use crate::model::OperationRecord;

/// Merge candidate lists given in priority order.
///
/// The first edge seen for an ordered `(from, to)` pair wins; later
/// candidates for the same pair are dropped whatever their kind.
pub fn merge_edges(candidates: Vec<Vec<FlowEdge>>) -> Vec<FlowEdge> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut merged = Vec::new();
    for edge in candidates.into_iter().flatten() {
        if seen.insert((edge.from.clone(), edge.to.clone())) {
            merged.push(edge);
        }
    }
    merged
}

/// Mark every edge touching a failed node as failed.
pub fn apply_failure_status(edges: &mut [FlowEdge], nodes: &[ProcessedOperation]) {
    let failed: HashSet<&str> = nodes
        .iter()
        .filter(|n| n.failed)
        .map(|n| n.node_id.as_str())
        .collect();
    if failed.is_empty() {
        return;
    }
    for edge in edges.iter_mut() {
        if failed.contains(edge.from.as_str()) || failed.contains(edge.to.as_str()) {
            edge.failed = true;
        }
    }
}

/// Run every heuristic over processed nodes and merge the results.
pub fn build_edges(nodes: &[ProcessedOperation], ctx: &FlowContext<'_>) -> Vec<FlowEdge> {
    let candidates: Vec<Vec<FlowEdge>> = HEURISTICS
        .iter()
        .map(|h| {
            let edges = (h.run)(nodes, ctx);
            tracing::debug!(heuristic = %h.kind, candidates = edges.len(), "ran flow heuristic");
            edges
        })
        .collect();
    let mut edges = merge_edges(candidates);
    apply_failure_status(&mut edges, nodes);
    edges
}

/// Infer the flow edges of an operation list.
///
/// `initiator` is the declared fee-payer address, if the source provides one.
pub fn build_flow_graph(
    ops: &[OperationRecord],
    initiator: Option<&str>,
    cfg: &AnalysisConfig,
) -> Vec<FlowEdge> {
    let nodes = ProcessedOperation::from_operations(ops, cfg);
    build_edges(&nodes, &FlowContext { initiator, cfg })
}

impl FlowGraph {
    /// Build the complete graph, nodes included, for a canonical transaction.
    pub fn from_transaction(tx: &CanonicalTransaction, cfg: &AnalysisConfig) -> Self {
        let nodes = ProcessedOperation::from_operations(&tx.account_updates, cfg);
        let ctx = FlowContext {
            initiator: tx.meta.fee_payer_address.as_deref(),
            cfg,
        };
        let edges = build_edges(&nodes, &ctx);
        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "built flow graph"
        );
        FlowGraph {
            metadata: tx.meta.clone(),
            nodes,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::model::EdgeKind;

    fn edge(kind: EdgeKind, from: &str, to: &str) -> FlowEdge {
        FlowEdge {
            from: from.to_string(),
            to: to.to_string(),
            kind,
            label: kind.label().to_string(),
            failed: false,
        }
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let merged = merge_edges(vec![
            vec![edge(EdgeKind::CallDepth, "au-0", "au-1")],
            vec![
                edge(EdgeKind::Sequence, "au-0", "au-1"),
                edge(EdgeKind::Sequence, "au-1", "au-2"),
            ],
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].kind, EdgeKind::CallDepth);
        assert_eq!(merged[1].kind, EdgeKind::Sequence);
    }

    #[test]
    fn test_merge_treats_direction_as_distinct() {
        let merged = merge_edges(vec![vec![
            edge(EdgeKind::StateDependency, "au-0", "au-1"),
            edge(EdgeKind::StateDependency, "au-1", "au-0"),
        ]]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_failure_marks_both_directions() {
        let cfg = AnalysisConfig::default();
        let ops = vec![
            OperationRecord::new("a", "A"),
            OperationRecord::new("b", "B").with_failure(Some("boom".into())),
            OperationRecord::new("c", "C"),
            OperationRecord::new("d", "D"),
        ];
        let edges = build_flow_graph(&ops, None, &cfg);
        let failed: Vec<bool> = edges.iter().map(|e| e.failed).collect();
        assert_eq!(failed, vec![true, true, false]);
    }

    #[test]
    fn test_empty_list_has_no_edges() {
        assert!(build_flow_graph(&[], None, &AnalysisConfig::default()).is_empty());
    }
}
