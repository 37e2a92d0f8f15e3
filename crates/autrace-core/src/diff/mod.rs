//! Structural diff of operation lists.
//!
//! ## Entry point
//!
//! ```ignore
//! use autrace_core::diff::compute_diff;
//!
//! let log = compute_diff(Some(&previous), Some(&current), &cfg);
//! ```
//!
//! ## Guarantees
//!
//! - **No-op symmetry**: diffing a list against an identical copy yields an empty log.
//! - **Path addressing**: every path is `root[index].dotted.key`.
//! - **Determinism**: output order follows input list order, then lexicographic key order.
//! - Callable fields are never compared or emitted.

pub mod compare;
pub mod engine;
pub mod keys;
pub mod model;

pub use compare::values_equal;
pub use engine::compute_diff;
pub use keys::{enumerate_keys, enumerate_leaves};
pub use model::{ChangeLog, ChangeNode, FieldChange, PathEntry, UpdatedEntry};
