//! Domain model: tagged values, operation records and lifecycle phases.

pub mod operation;
pub mod phase;
pub mod value;

pub use operation::{AuthorizationKind, OperationRecord, UNNAMED_LABEL};
pub use phase::Phase;
pub use value::{OpaqueKind, OpaqueToken, Primitive, Value};
