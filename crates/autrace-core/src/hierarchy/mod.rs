//! Hierarchy inference over flat, depth-annotated operations.
//!
//! [`HierarchyEngine::process`] runs a call-stack algorithm per operation;
//! [`HierarchyEngine::resolve_resource_orphans`] then links parentless
//! operations that share a resource. Every read accessor resolves orphans
//! first.

pub mod engine;
pub mod model;

pub use engine::HierarchyEngine;
pub use model::{EdgeStatus, HierarchyNode, MethodInfo, Relationship, RelationshipEdge, StateChange};
