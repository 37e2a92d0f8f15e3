//! Structured logging facility for autrace
//!
//! This module provides a canonical logging facility with:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use autrace_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```
//!
//! Operation boundaries (`start`/`end`/`end_error`) are owned by the engine
//! layer. The analysis algorithms in this crate only emit `tracing::debug!`.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use autrace_core_types::schema;
pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
