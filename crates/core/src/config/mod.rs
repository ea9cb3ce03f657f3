//! Configuration loading and management.
//!
//! This module loads project settings from the `.stepkit/` directory.

pub mod error;
pub mod loader;
pub mod models;
