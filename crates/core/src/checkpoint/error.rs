//! Error types for checkpoint persistence.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while saving or loading checkpoints.
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Failed to read, write or rename a checkpoint file.
    #[error("Checkpoint I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to encode a checkpoint as JSON.
    #[error("Failed to serialize checkpoint for run {run_id}: {source}")]
    Serialize {
        run_id: Uuid,
        source: serde_json::Error,
    },

    /// A checkpoint file exists but could not be decoded.
    #[error("Failed to parse checkpoint at {path}: {source}")]
    Deserialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// No checkpoint exists for the run.
    #[error("No checkpoint found for run {0}")]
    NotFound(Uuid),

    /// The blocking write task panicked or was cancelled.
    #[error("Checkpoint write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Type alias for Result with CheckpointError.
pub type CheckpointResult<T> = Result<T, CheckpointError>;
