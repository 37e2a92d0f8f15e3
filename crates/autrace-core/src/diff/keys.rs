//! Dotted-path key enumeration down to leaf values.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::Value;

/// True if `value` is not descended into during enumeration.
///
/// Lists count as leaves: their contents are compared as a whole, which keeps
/// array-shaped payloads (app state, proofs) from exploding into one path per
/// element.
pub fn is_leaf(value: &Value) -> bool {
    match value {
        Value::Record(map) => map.is_empty(),
        _ => true,
    }
}

/// Every dotted leaf path under `node`, each prefixed by `prefix`.
///
/// A leaf at the root yields `prefix` itself.
pub fn enumerate_keys(node: &Value, prefix: &str) -> BTreeSet<String> {
    enumerate_leaves(node, prefix).into_keys().collect()
}

/// Like [`enumerate_keys`], but keeps a reference to each leaf value.
pub fn enumerate_leaves<'a>(node: &'a Value, prefix: &str) -> BTreeMap<String, &'a Value> {
    let mut out = BTreeMap::new();
    collect(node, prefix.to_string(), &mut out);
    out
}

fn collect<'a>(node: &'a Value, prefix: String, out: &mut BTreeMap<String, &'a Value>) {
    match node {
        Value::Record(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                collect(child, path, out);
            }
        }
        _ => {
            out.insert(prefix, node);
        }
    }
}
