//! # sk-protocol
//!
//! Core protocol definitions and data models for stepkit.
//!
//! This crate defines all shared data structures used for:
//! - Terminal outcomes and persistable causes of interruption
//! - Durable run records and the actions attached to them
//! - Configuration file parsing (`.stepkit/config.toml`)
//! - Events emitted by the engine
//!
//! ## Modules
//!
//! - [`result_models`]: Terminal outcomes and their severity ordering
//! - [`cause_models`]: Persistable causes of interruption
//! - [`run_models`]: Run records, statuses and actions
//! - [`config_models`]: Global configuration from config.toml
//! - [`ipc`]: Events sent from the core to observers
//!
//! Every type here is plain data: behavior lives in `sk-core`.

pub mod cause_models;
pub mod config_models;
pub mod ipc;
pub mod result_models;
pub mod run_models;

// Re-export all public types for convenience
pub use cause_models::*;
pub use config_models::*;
pub use ipc::*;
pub use result_models::*;
pub use run_models::*;
