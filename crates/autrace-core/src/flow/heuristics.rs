//! Edge-producing heuristics, listed in merge priority order.
//!
//! Each heuristic is a plain function over the processed node list so it can
//! be exercised on its own. [`HEURISTICS`] fixes the order in which their
//! candidates are merged.

use std::collections::{BTreeMap, HashMap};

use crate::config::AnalysisConfig;
use crate::flow::model::{EdgeKind, FlowEdge, ProcessedOperation};

/// Inputs shared by all heuristics beyond the node list.
#[derive(Debug, Clone, Copy)]
pub struct FlowContext<'a> {
    /// Declared initiator (fee payer) address
    pub initiator: Option<&'a str>,
    pub cfg: &'a AnalysisConfig,
}

/// A named edge producer.
#[derive(Clone, Copy)]
pub struct Heuristic {
    pub kind: EdgeKind,
    pub run: fn(&[ProcessedOperation], &FlowContext<'_>) -> Vec<FlowEdge>,
}

impl std::fmt::Debug for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heuristic").field("kind", &self.kind).finish()
    }
}

/// All heuristics, highest priority first.
pub const HEURISTICS: [Heuristic; 6] = [
    Heuristic {
        kind: EdgeKind::CallDepth,
        run: call_depth_edges,
    },
    Heuristic {
        kind: EdgeKind::StateDependency,
        run: state_dependency_edges,
    },
    Heuristic {
        kind: EdgeKind::TokenOperation,
        run: token_operation_edges,
    },
    Heuristic {
        kind: EdgeKind::FeePayer,
        run: fee_payer_edges,
    },
    Heuristic {
        kind: EdgeKind::CallData,
        run: call_data_edges,
    },
    Heuristic {
        kind: EdgeKind::Sequence,
        run: sequence_edges,
    },
];

/// Link each node at depth `d > 0` to the closest preceding node at `d - 1`
/// with the same address.
pub fn call_depth_edges(nodes: &[ProcessedOperation], _ctx: &FlowContext<'_>) -> Vec<FlowEdge> {
    let mut by_depth: BTreeMap<u32, Vec<&ProcessedOperation>> = BTreeMap::new();
    for node in nodes {
        by_depth.entry(node.call_depth).or_default().push(node);
    }

    let mut edges = Vec::new();
    for (&depth, children) in by_depth.range(1..) {
        let Some(parents) = by_depth.get(&(depth - 1)) else {
            continue;
        };
        for child in children {
            if child.address.is_empty() {
                continue;
            }
            let parent = parents
                .iter()
                .filter(|p| p.address == child.address && p.index < child.index)
                .max_by_key(|p| p.index);
            if let Some(parent) = parent {
                edges.push(FlowEdge::new(EdgeKind::CallDepth, parent, child));
            }
        }
    }
    edges
}

/// Chain nodes that hold the same non-zero app-state value.
///
/// Values are visited in order of first appearance. A value repeated within
/// one node does not produce a self-edge.
pub fn state_dependency_edges(
    nodes: &[ProcessedOperation],
    _ctx: &FlowContext<'_>,
) -> Vec<FlowEdge> {
    let mut first_seen: Vec<&str> = Vec::new();
    let mut holders: HashMap<&str, Vec<&ProcessedOperation>> = HashMap::new();

    for node in nodes {
        for value in &node.state_values {
            if value.is_empty() || value == "0" {
                continue;
            }
            let entry = holders.entry(value.as_str()).or_default();
            if entry.is_empty() {
                first_seen.push(value.as_str());
            }
            entry.push(node);
        }
    }

    let mut edges = Vec::new();
    for value in first_seen {
        let Some(list) = holders.get_mut(value) else {
            continue;
        };
        if list.len() < 2 {
            continue;
        }
        list.sort_by_key(|n| n.index);
        for pair in list.windows(2) {
            if pair[0].index != pair[1].index {
                edges.push(FlowEdge::new(EdgeKind::StateDependency, pair[0], pair[1]));
            }
        }
    }
    edges
}

/// Chain nodes sharing a non-default resource, in list order.
pub fn token_operation_edges(
    nodes: &[ProcessedOperation],
    ctx: &FlowContext<'_>,
) -> Vec<FlowEdge> {
    let mut groups: BTreeMap<&str, Vec<&ProcessedOperation>> = BTreeMap::new();
    for node in nodes {
        if !ctx.cfg.is_default_resource(&node.resource_id) {
            groups.entry(node.resource_id.as_str()).or_default().push(node);
        }
    }

    let mut edges = Vec::new();
    for members in groups.values_mut() {
        members.sort_by_key(|n| n.index);
        for pair in members.windows(2) {
            edges.push(FlowEdge::new(EdgeKind::TokenOperation, pair[0], pair[1]));
        }
    }
    edges
}

/// Link the initiating node to the first later node with another address.
///
/// The initiator is the node whose address matches the declared initiator,
/// or failing that the first node with a negative balance change. With
/// neither signal no edge is produced.
pub fn fee_payer_edges(nodes: &[ProcessedOperation], ctx: &FlowContext<'_>) -> Vec<FlowEdge> {
    let declared = ctx
        .initiator
        .filter(|addr| !addr.is_empty())
        .and_then(|addr| nodes.iter().find(|n| n.address == addr));
    let payer = declared.or_else(|| {
        nodes
            .iter()
            .find(|n| n.balance_change.is_some_and(|b| b < 0))
    });
    let Some(payer) = payer else {
        return Vec::new();
    };

    nodes
        .iter()
        .skip(payer.index + 1)
        .find(|n| n.address != payer.address)
        .map(|target| vec![FlowEdge::new(EdgeKind::FeePayer, payer, target)])
        .unwrap_or_default()
}

/// Link each node carrying call data to the node right after it.
pub fn call_data_edges(nodes: &[ProcessedOperation], _ctx: &FlowContext<'_>) -> Vec<FlowEdge> {
    nodes
        .windows(2)
        .filter(|pair| pair[0].call_data.is_some())
        .map(|pair| FlowEdge::new(EdgeKind::CallData, &pair[0], &pair[1]))
        .collect()
}

/// Link every consecutive pair.
pub fn sequence_edges(nodes: &[ProcessedOperation], _ctx: &FlowContext<'_>) -> Vec<FlowEdge> {
    nodes
        .windows(2)
        .map(|pair| FlowEdge::new(EdgeKind::Sequence, &pair[0], &pair[1]))
        .collect()
}
