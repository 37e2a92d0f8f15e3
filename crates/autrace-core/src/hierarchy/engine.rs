//! Call-stack hierarchy inference.

use std::collections::{BTreeMap, HashMap};

use crate::config::AnalysisConfig;
use crate::hierarchy::model::{
    EdgeStatus, HierarchyNode, MethodInfo, Relationship, RelationshipEdge, StateChange,
};
use crate::model::OperationRecord;

/// Reconstructs parent/child relationships from depth-annotated operations.
///
/// One instance serves one transaction at a time. Call [`reset`](Self::reset)
/// before feeding a new transaction; state is never shared between instances.
#[derive(Debug, Clone)]
pub struct HierarchyEngine {
    parent_stack: Vec<String>,
    current_depth: i64,
    relationships: HashMap<String, Relationship>,
    /// Ids in first-seen order
    order: Vec<String>,
    resource_groups: BTreeMap<String, Vec<String>>,
    cfg: AnalysisConfig,
}

impl Default for HierarchyEngine {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl HierarchyEngine {
    pub fn new(cfg: &AnalysisConfig) -> Self {
        Self {
            parent_stack: Vec::new(),
            current_depth: 0,
            relationships: HashMap::new(),
            order: Vec::new(),
            resource_groups: BTreeMap::new(),
            cfg: cfg.clone(),
        }
    }

    /// Clear all per-transaction state.
    pub fn reset(&mut self) {
        self.parent_stack.clear();
        self.current_depth = 0;
        self.relationships.clear();
        self.order.clear();
        self.resource_groups.clear();
    }

    /// Feed every operation of a transaction in list order.
    pub fn process_all(&mut self, ops: &[OperationRecord]) {
        for op in ops {
            self.process(op);
        }
    }

    /// Record one operation.
    ///
    /// The stack is unwound until its top is the most recent open operation
    /// at a strictly smaller depth. Failed operations are recorded but never
    /// pushed, so nothing can become their child.
    pub fn process(&mut self, op: &OperationRecord) {
        let depth = i64::from(op.call_depth);

        while self.current_depth >= depth && !self.parent_stack.is_empty() {
            self.parent_stack.pop();
            self.current_depth -= 1;
        }

        let parent_id = self.parent_stack.last().cloned();

        let prefix = &self.cfg.failure_label_prefix;
        let label = if op.failed && !op.label.starts_with(prefix.as_str()) {
            format!("{}{}", prefix, op.label)
        } else {
            op.label.clone()
        };

        let relationship = Relationship {
            id: op.id.clone(),
            label,
            parent_id: parent_id.clone(),
            children: Vec::new(),
            depth: op.call_depth,
            resource_id: op.resource_id.clone(),
            failed: op.failed,
            failure_reason: op.failure_reason.clone(),
            method: MethodInfo::from_label(&op.label),
            state_changes: StateChange::from_operation(op),
        };

        if let Some(parent) = parent_id
            .as_ref()
            .and_then(|pid| self.relationships.get_mut(pid))
        {
            parent.children.push(op.id.clone());
        }

        if self.relationships.insert(op.id.clone(), relationship).is_none() {
            self.order.push(op.id.clone());
        }

        self.resource_groups
            .entry(op.resource_id.clone())
            .or_default()
            .push(op.id.clone());

        if !op.failed {
            self.parent_stack.push(op.id.clone());
            self.current_depth = depth;
        }

        tracing::debug!(
            operation_id = %op.id,
            depth = op.call_depth,
            parent = ?self.relationships.get(&op.id).and_then(|r| r.parent_id.as_deref()),
            failed = op.failed,
            "processed operation"
        );
    }

    /// Link parentless operations that share a resource.
    ///
    /// Within each resource group, the first non-failed orphan becomes the
    /// parent of every later non-failed orphan. The default and native-token
    /// groups are never linked.
    /// Running this twice has no further effect.
    pub fn resolve_resource_orphans(&mut self) {
        let mut links: Vec<(String, String)> = Vec::new();

        for (resource_id, ids) in &self.resource_groups {
            if self.cfg.is_default_resource(resource_id) || ids.len() < 2 {
                continue;
            }
            let orphans: Vec<&String> = ids
                .iter()
                .filter(|id| {
                    self.relationships
                        .get(*id)
                        .is_some_and(|r| r.parent_id.is_none() && !r.failed)
                })
                .collect();
            if let Some((root, rest)) = orphans.split_first() {
                for orphan in rest {
                    if orphan != root {
                        links.push(((*root).clone(), (*orphan).clone()));
                    }
                }
            }
        }

        for (root, orphan) in links {
            if let Some(child) = self.relationships.get_mut(&orphan) {
                if child.parent_id.is_some() {
                    continue;
                }
                child.parent_id = Some(root.clone());
            }
            if let Some(parent) = self.relationships.get_mut(&root) {
                parent.children.push(orphan.clone());
            }
            tracing::debug!(root = %root, orphan = %orphan, "linked resource orphan");
        }
    }

    /// All relationships keyed by id, after orphan resolution.
    pub fn relationships(&mut self) -> &HashMap<String, Relationship> {
        self.resolve_resource_orphans();
        &self.relationships
    }

    /// Relationships in processing order, after orphan resolution.
    pub fn ordered_relationships(&mut self) -> Vec<Relationship> {
        self.resolve_resource_orphans();
        self.order
            .iter()
            .filter_map(|id| self.relationships.get(id).cloned())
            .collect()
    }

    /// Current call stack, bottom first.
    pub fn parent_stack(&self) -> &[String] {
        &self.parent_stack
    }

    /// The relationship forest as nested trees, roots in processing order.
    pub fn hierarchical_view(&mut self) -> Vec<HierarchyNode> {
        self.resolve_resource_orphans();
        self.order
            .iter()
            .filter_map(|id| self.relationships.get(id))
            .filter(|r| r.parent_id.is_none())
            .map(|root| self.build_node(root))
            .collect()
    }

    fn build_node(&self, rel: &Relationship) -> HierarchyNode {
        HierarchyNode {
            id: rel.id.clone(),
            label: rel.label.clone(),
            method: rel.method.clone(),
            state_changes: rel.state_changes.clone(),
            children: rel
                .children
                .iter()
                .filter_map(|child_id| self.relationships.get(child_id))
                .map(|child| self.build_node(child))
                .collect(),
        }
    }

    /// One edge per parented relationship, numbered in processing order.
    pub fn relationship_edges(&mut self) -> Vec<RelationshipEdge> {
        self.ordered_relationships()
            .into_iter()
            .filter_map(|rel| {
                let parent = rel.parent_id.clone()?;
                Some((parent, rel))
            })
            .enumerate()
            .map(|(i, (from, rel))| RelationshipEdge {
                id: format!("op{}", i + 1),
                from,
                to: rel.id.clone(),
                sequence: i + 1,
                operation_type: rel
                    .method
                    .as_ref()
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| "update".to_string()),
                status: if rel.failed {
                    EdgeStatus::Failed
                } else {
                    EdgeStatus::Success
                },
                state_value: rel.state_changes.first().map(|s| s.value.clone()),
            })
            .collect()
    }
}
