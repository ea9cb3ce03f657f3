//! Global configuration models for `.stepkit/config.toml`.
//!
//! This module defines the structure of the global configuration file that
//! controls project-wide settings for stepkit.

use crate::result_models::RunResult;
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use ts_rs::TS;

/// Represents global settings from `.stepkit/config.toml`.
///
/// # Example
///
/// ```toml
/// # .stepkit/config.toml
/// checkpoint-dir = "var/checkpoints"
/// abort-result = "ABORTED"
/// event-buffer = 256
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Directory holding checkpoints of suspended runs.
    ///
    /// Relative paths are resolved against the project root.
    #[serde(default = "default_checkpoint_dir")]
    #[ts(type = "string")]
    pub checkpoint_dir: PathBuf,

    /// Result given to a run aborted by a user when the caller does not
    /// name one.
    #[serde(default = "default_abort_result")]
    pub abort_result: RunResult,

    /// Capacity of the event and interrupt channels.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from(".stepkit/checkpoints")
}

fn default_abort_result() -> RunResult {
    RunResult::Aborted
}

fn default_event_buffer() -> usize {
    100
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: default_checkpoint_dir(),
            abort_result: default_abort_result(),
            event_buffer: default_event_buffer(),
        }
    }
}
