//! State management for pipeline runs.
//!
//! This module provides:
//! - Run state machine logic
//! - StateManager for coordinating multiple runs

pub mod manager;
pub mod run;
