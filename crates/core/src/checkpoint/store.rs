//! File-backed checkpoint store.
//!
//! Each run gets one `<run-id>.json` file in the store directory. Writes go
//! to a temporary file in the same directory first and are then renamed into
//! place, so a crash never leaves a half-written checkpoint behind.

use crate::checkpoint::error::{CheckpointError, CheckpointResult};
use crate::interrupt::signal::FlowInterrupted;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sk_protocol::run_models::Run;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// The persisted state of a suspended run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StepCheckpoint {
    /// The run as it was when it was suspended.
    pub run: Run,

    /// Index of the first step to execute on resume.
    pub next_step: usize,

    /// An interruption delivered while the run was suspended.
    ///
    /// Reported as soon as the run is resumed.
    #[serde(default)]
    pub pending_interruption: Option<FlowInterrupted>,

    pub saved_at: DateTime<Utc>,
}

impl StepCheckpoint {
    pub fn new(run: Run, next_step: usize) -> Self {
        Self {
            run,
            next_step,
            pending_interruption: None,
            saved_at: Utc::now(),
        }
    }
}

/// Stores checkpoints as JSON files in a directory.
///
/// All file access happens off the async worker threads: reads and deletes
/// go through `tokio::fs`, and the atomic write runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, run_id: Uuid) -> PathBuf {
        self.dir.join(format!("{run_id}.json"))
    }

    /// Write a checkpoint, replacing any previous one for the same run.
    ///
    /// # Errors
    ///
    /// Returns `CheckpointError` if the directory cannot be created, the
    /// checkpoint cannot be encoded, or the file cannot be written.
    pub async fn save(&self, checkpoint: &StepCheckpoint) -> CheckpointResult<()> {
        let store = self.clone();
        let checkpoint = checkpoint.clone();
        tokio::task::spawn_blocking(move || store.write_atomically(&checkpoint)).await?
    }

    fn write_atomically(&self, checkpoint: &StepCheckpoint) -> CheckpointResult<()> {
        let run_id = checkpoint.run.id;
        let path = self.path_for(run_id);

        std::fs::create_dir_all(&self.dir).map_err(|source| CheckpointError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let json = serde_json::to_vec_pretty(checkpoint)
            .map_err(|source| CheckpointError::Serialize { run_id, source })?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|source| CheckpointError::Io {
            path: self.dir.clone(),
            source,
        })?;
        tmp.write_all(&json)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|source| CheckpointError::Io {
                path: tmp.path().to_path_buf(),
                source,
            })?;
        tmp.persist(&path).map_err(|e| CheckpointError::Io {
            path: path.clone(),
            source: e.error,
        })?;

        debug!(run_id = %run_id, path = %path.display(), "checkpoint saved");
        Ok(())
    }

    /// Load the checkpoint for a run.
    ///
    /// # Errors
    ///
    /// Returns `CheckpointError::NotFound` if the run has no checkpoint, or
    /// another variant if the file cannot be read or decoded.
    pub async fn load(&self, run_id: Uuid) -> CheckpointResult<StepCheckpoint> {
        let path = self.path_for(run_id);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CheckpointError::NotFound(run_id));
            }
            Err(source) => return Err(CheckpointError::Io { path, source }),
        };

        serde_json::from_slice(&content)
            .map_err(|source| CheckpointError::Deserialize { path, source })
    }

    pub async fn exists(&self, run_id: Uuid) -> bool {
        fs::metadata(self.path_for(run_id))
            .await
            .is_ok_and(|meta| meta.is_file())
    }

    /// Delete the checkpoint for a run. Missing checkpoints are not an error.
    pub async fn remove(&self, run_id: Uuid) -> CheckpointResult<()> {
        let path = self.path_for(run_id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CheckpointError::Io { path, source }),
        }
    }
}
