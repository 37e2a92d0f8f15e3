//! Core types shared across autrace facilities
//!
//! This crate provides foundational types used by the logging facility,
//! the analysis engine and the CLI adapter:
//!
//! - **Correlation types**: RunId, SnapshotId
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RunId, SnapshotId};
