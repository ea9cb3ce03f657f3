//! # sk-core
//!
//! Interruption signaling and step execution for stepkit.
//!
//! This crate provides:
//! - The interruption signal a step raises to stop its run, with the causes
//!   explaining why and the result the run should adopt
//! - A sequential step engine that reports interruptions on the run
//! - Checkpoints for suspended runs, which carry pending interruptions
//! - State management for running and suspended runs
//! - Configuration loading from the `.stepkit/` directory
//!
//! ## Modules
//!
//! - [`interrupt`]: Interruption signal, causes and output sinks
//! - [`engine`]: Step abstraction and pipeline execution engine
//! - [`checkpoint`]: Persisted state of suspended runs
//! - [`state`]: Run state transitions and the run manager
//! - [`config`]: Configuration loading and management

pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod interrupt;
pub mod state;
