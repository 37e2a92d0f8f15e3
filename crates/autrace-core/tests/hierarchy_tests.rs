//! Call-stack hierarchy reconstruction and resource orphan linking.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use autrace_core::hierarchy::HierarchyEngine;
use autrace_core::model::OperationRecord;
use autrace_core::AnalysisConfig;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ops_with_depths(depths: &[u32]) -> Vec<OperationRecord> {
    depths
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let id = ((b'a' + i as u8) as char).to_string();
            OperationRecord::new(id.clone(), id).with_call_depth(*d)
        })
        .collect()
}

fn parent(engine: &mut HierarchyEngine, id: &str) -> Option<String> {
    engine.relationships().get(id).and_then(|r| r.parent_id.clone())
}

// ---------------------------------------------------------------------------
// Depth-based nesting
// ---------------------------------------------------------------------------

#[test]
fn test_depth_sequence_reconstructs_nesting() {
    let mut engine = HierarchyEngine::new(&AnalysisConfig::default());
    engine.process_all(&ops_with_depths(&[0, 1, 2, 1, 0]));

    assert_eq!(parent(&mut engine, "a"), None);
    assert_eq!(parent(&mut engine, "b").as_deref(), Some("a"));
    assert_eq!(parent(&mut engine, "c").as_deref(), Some("b"));
    assert_eq!(parent(&mut engine, "d").as_deref(), Some("a"));
    assert_eq!(parent(&mut engine, "e"), None);

    let rels = engine.relationships();
    assert_eq!(rels["a"].children, vec!["b", "d"]);
    assert_eq!(rels["b"].children, vec!["c"]);
}

#[test]
fn test_every_parent_lists_its_children() {
    let mut engine = HierarchyEngine::default();
    engine.process_all(&ops_with_depths(&[0, 1, 1, 2, 3, 1, 0, 1]));
    let rels = engine.relationships().clone();
    for rel in rels.values() {
        if let Some(pid) = &rel.parent_id {
            assert!(
                rels[pid].children.contains(&rel.id),
                "{} missing from children of {}",
                rel.id,
                pid
            );
        }
    }
}

#[test]
fn test_depth_zero_never_has_parent() {
    let mut engine = HierarchyEngine::default();
    engine.process_all(&ops_with_depths(&[2, 3, 0, 4, 0]));
    assert_eq!(parent(&mut engine, "c"), None);
    assert_eq!(parent(&mut engine, "e"), None);
}

// ---------------------------------------------------------------------------
// Failed operations
// ---------------------------------------------------------------------------

#[test]
fn test_failed_operation_is_never_a_parent() {
    let mut ops = ops_with_depths(&[0, 1, 2, 2]);
    ops[1] = ops[1].clone().with_failure(Some("Cancelled".to_string()));

    let mut engine = HierarchyEngine::default();
    for op in &ops {
        engine.process(op);
        assert!(!engine.parent_stack().contains(&"b".to_string()));
    }

    assert_eq!(parent(&mut engine, "b").as_deref(), Some("a"));
    assert_eq!(parent(&mut engine, "c").as_deref(), Some("a"));
    // d is c's sibling at the same depth
    assert_eq!(parent(&mut engine, "d").as_deref(), Some("a"));
    let rels = engine.relationships();
    assert!(rels["b"].children.is_empty());
    assert!(rels["b"].failed);
    assert_eq!(rels["b"].label, "[FAILED] b");
    assert_eq!(rels["b"].failure_reason.as_deref(), Some("Cancelled"));
}

#[test]
fn test_failure_does_not_stop_later_operations() {
    let mut ops = ops_with_depths(&[0, 0, 0]);
    ops[0] = ops[0].clone().with_failure(None);
    let mut engine = HierarchyEngine::default();
    engine.process_all(&ops);
    assert_eq!(engine.relationships().len(), 3);
}

// ---------------------------------------------------------------------------
// Resource orphan linking
// ---------------------------------------------------------------------------

#[test]
fn test_top_level_operations_sharing_resource_are_linked() {
    let ops: Vec<_> = ops_with_depths(&[0, 0, 0])
        .into_iter()
        .map(|op| op.with_resource_id("xTokenId"))
        .collect();
    let mut engine = HierarchyEngine::default();
    engine.process_all(&ops);

    assert_eq!(parent(&mut engine, "a"), None);
    assert_eq!(parent(&mut engine, "b").as_deref(), Some("a"));
    assert_eq!(parent(&mut engine, "c").as_deref(), Some("a"));
    assert_eq!(engine.relationships()["a"].children, vec!["b", "c"]);
}

#[test]
fn test_failed_orphans_are_not_linked() {
    let mut ops: Vec<_> = ops_with_depths(&[0, 0, 0])
        .into_iter()
        .map(|op| op.with_resource_id("xTokenId"))
        .collect();
    ops[1] = ops[1].clone().with_failure(None);
    let mut engine = HierarchyEngine::default();
    engine.process_all(&ops);

    assert_eq!(parent(&mut engine, "b"), None);
    assert_eq!(parent(&mut engine, "c").as_deref(), Some("a"));
}

#[test]
fn test_native_token_group_is_not_linked() {
    let cfg = AnalysisConfig::default();
    let ops: Vec<_> = ops_with_depths(&[0, 0])
        .into_iter()
        .map(|op| op.with_resource_id(cfg.native_token_id.clone()))
        .collect();
    let mut engine = HierarchyEngine::new(&cfg);
    engine.process_all(&ops);
    assert_eq!(parent(&mut engine, "b"), None);
}

#[test]
fn test_orphan_linking_keeps_a_forest() {
    let ops = vec![
        OperationRecord::new("a", "A").with_resource_id("t"),
        OperationRecord::new("b", "B").with_call_depth(1).with_resource_id("t"),
        OperationRecord::new("c", "C").with_resource_id("t"),
    ];
    let mut engine = HierarchyEngine::default();
    engine.process_all(&ops);
    // b already has a depth parent; only c is linked
    assert_eq!(parent(&mut engine, "b").as_deref(), Some("a"));
    assert_eq!(parent(&mut engine, "c").as_deref(), Some("a"));
    assert_eq!(engine.relationships()["a"].children, vec!["b", "c"]);
}

// ---------------------------------------------------------------------------
// Derived info
// ---------------------------------------------------------------------------

#[test]
fn test_method_info_is_parsed_from_label() {
    let mut engine = HierarchyEngine::default();
    engine.process(&OperationRecord::new("1", "FungibleToken.transfer()"));
    let rel = &engine.relationships()["1"];
    let method = rel.method.as_ref().unwrap();
    assert_eq!(method.contract, "FungibleToken");
    assert_eq!(method.name, "transfer");
}

#[test]
fn test_reset_allows_reuse_for_new_transaction() {
    let mut engine = HierarchyEngine::default();
    engine.process_all(&ops_with_depths(&[0, 1]));
    engine.reset();
    engine.process_all(&ops_with_depths(&[0]));
    assert_eq!(engine.relationships().len(), 1);
    assert!(engine.relationships()["a"].children.is_empty());
}
