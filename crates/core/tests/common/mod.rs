//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality across all integration tests:
//! - Test fixtures (steps, causes, pipelines, project directories)
//! - Custom assertions over emitted events
//! - Log capture for tracing output

pub mod assertions;
pub mod fixtures;
pub mod logs;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use logs::*;
