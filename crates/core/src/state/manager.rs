//! State manager for coordinating multiple pipeline runs.
//!
//! The StateManager starts runs in background tasks and lets any other task
//! interrupt them. A live run receives the signal through its interrupt
//! channel; a suspended run gets it parked in its checkpoint, to be reported
//! when the run is resumed.

use crate::checkpoint::store::CheckpointStore;
use crate::config::models::AppConfig;
use crate::engine::step::Pipeline;
use crate::engine::PipelineEngine;
use crate::interrupt::signal::FlowInterrupted;
use crate::state::run::create_run;
use anyhow::{anyhow, bail, Result};
use sk_protocol::cause_models::CauseOfInterruption;
use sk_protocol::ipc::Event;
use sk_protocol::result_models::RunResult;
use sk_protocol::run_models::{Run, RunStatus};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

type LiveRuns = Arc<Mutex<HashMap<Uuid, mpsc::Sender<FlowInterrupted>>>>;
type SettledRuns = Arc<Mutex<HashMap<Uuid, Run>>>;

/// Manages all pipeline runs.
pub struct StateManager {
    /// Interrupt channels of runs whose task is still executing.
    live: LiveRuns,

    /// Last known state of runs whose task has ended (finished or suspended).
    runs: SettledRuns,

    engine: Arc<PipelineEngine>,

    /// Channel for sending events to observers.
    events_tx: mpsc::Sender<Event>,

    abort_result: RunResult,
    buffer: usize,
}

impl StateManager {
    /// Create a new StateManager from loaded configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Project configuration (checkpoint directory, defaults)
    /// * `events_tx` - Channel for sending events to observers
    pub fn new(config: &AppConfig, events_tx: mpsc::Sender<Event>) -> Self {
        let engine = PipelineEngine::new(CheckpointStore::new(config.checkpoint_dir()));

        Self {
            live: Arc::new(Mutex::new(HashMap::new())),
            runs: Arc::new(Mutex::new(HashMap::new())),
            engine: Arc::new(engine),
            events_tx,
            abort_result: config.global.abort_result,
            buffer: config.global.event_buffer.max(1),
        }
    }

    /// Start executing a pipeline in the background.
    ///
    /// The run id is assigned before the task is spawned, so it can be used
    /// to interrupt the run right away.
    pub async fn start_pipeline(&self, pipeline: Arc<Pipeline>) -> Uuid {
        let run = create_run(pipeline.name.clone());
        let run_id = run.id;
        let (interrupt_tx, mut interrupts) = mpsc::channel(self.buffer);
        self.live.lock().await.insert(run_id, interrupt_tx);

        let engine = Arc::clone(&self.engine);
        let live = Arc::clone(&self.live);
        let runs = Arc::clone(&self.runs);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let run = engine
                .run_with(&pipeline, run, events_tx, &mut interrupts)
                .await;
            settle(run, interrupts, &live, &runs, engine.checkpoints()).await;
        });

        run_id
    }

    /// Resume a suspended run from its checkpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is still executing or has no checkpoint.
    pub async fn resume(&self, run_id: Uuid, pipeline: Arc<Pipeline>) -> Result<()> {
        let mut live = self.live.lock().await;
        if live.contains_key(&run_id) {
            bail!("Run {run_id} is still executing");
        }

        let checkpoint = self.engine.checkpoints().load(run_id).await?;
        let (interrupt_tx, mut interrupts) = mpsc::channel(self.buffer);
        live.insert(run_id, interrupt_tx);
        drop(live);

        let engine = Arc::clone(&self.engine);
        let live = Arc::clone(&self.live);
        let runs = Arc::clone(&self.runs);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let run = engine
                .resume(&pipeline, checkpoint, events_tx, &mut interrupts)
                .await;
            settle(run, interrupts, &live, &runs, engine.checkpoints()).await;
        });

        Ok(())
    }

    /// Interrupt a run.
    ///
    /// May be called from any task. A live run stops at its current step;
    /// a suspended run keeps the signal in its checkpoint until resumed.
    /// Runs suspended by an earlier process are found through their
    /// checkpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is unknown or already finishing, if a
    /// signal is already waiting to be delivered, or if the checkpoint
    /// cannot be updated. `Ok` means the signal will be reported on the run.
    pub async fn interrupt(&self, run_id: Uuid, signal: FlowInterrupted) -> Result<()> {
        let live = self.live.lock().await;

        if let Some(interrupt_tx) = live.get(&run_id) {
            return match interrupt_tx.try_send(signal) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => {
                    Err(anyhow!("Run {run_id} already has an interruption pending"))
                }
                Err(TrySendError::Closed(_)) => Err(anyhow!("Run {run_id} is shutting down")),
            };
        }

        let runs = self.runs.lock().await;
        let checkpoints = self.engine.checkpoints();
        match runs.get(&run_id).map(|run| run.status) {
            Some(RunStatus::Suspended) => park_interruption(checkpoints, run_id, signal).await,
            Some(status) if status.is_terminal() => Err(anyhow!(
                "Run {run_id} is no longer running (status {status:?})"
            )),
            Some(status) => Err(anyhow!(
                "Run {run_id} cannot be interrupted while {status:?}"
            )),
            // Suspended by an earlier process: only the checkpoint remains.
            None if checkpoints.exists(run_id).await => {
                park_interruption(checkpoints, run_id, signal).await
            }
            None => Err(anyhow!("Run {run_id} not found")),
        }
    }

    /// Abort a run on behalf of a user.
    ///
    /// Uses the configured abort result unless `result` is given.
    pub async fn abort(&self, run_id: Uuid, user: &str, result: Option<RunResult>) -> Result<()> {
        let signal = FlowInterrupted::from_cause(
            result.unwrap_or(self.abort_result),
            CauseOfInterruption::user(user),
        );
        self.interrupt(run_id, signal).await
    }

    /// Whether the run's task is still executing.
    pub async fn is_live(&self, run_id: Uuid) -> bool {
        self.live.lock().await.contains_key(&run_id)
    }

    /// Get the last settled state of a run.
    ///
    /// Returns None while the run has not yet finished or suspended for the
    /// first time.
    pub async fn get_run(&self, run_id: Uuid) -> Option<Run> {
        self.runs.lock().await.get(&run_id).cloned()
    }

    /// Get all settled runs.
    pub async fn get_all_runs(&self) -> Vec<Run> {
        self.runs.lock().await.values().cloned().collect()
    }

    /// Number of runs known to the manager, live or settled.
    pub async fn run_count(&self) -> usize {
        let live = self.live.lock().await;
        let runs = self.runs.lock().await;
        live.keys()
            .chain(runs.keys())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Store `signal` as the pending interruption of a suspended run.
async fn park_interruption(
    checkpoints: &CheckpointStore,
    run_id: Uuid,
    signal: FlowInterrupted,
) -> Result<()> {
    let mut checkpoint = checkpoints.load(run_id).await?;
    if checkpoint.pending_interruption.is_some() {
        bail!("Run {run_id} already has an interruption pending");
    }
    checkpoint.pending_interruption = Some(signal);
    checkpoints.save(&checkpoint).await?;
    debug!(run_id = %run_id, "interruption parked in checkpoint");
    Ok(())
}

/// Record the outcome of a run task.
///
/// Holds the live lock throughout so no interrupt can slip in between the
/// task ending and the run leaving the live set. A finished run has already
/// closed and drained its channel; signals queued behind a suspended run
/// are parked with its checkpoint.
async fn settle(
    run: Run,
    mut interrupts: mpsc::Receiver<FlowInterrupted>,
    live: &LiveRuns,
    runs: &SettledRuns,
    checkpoints: &CheckpointStore,
) {
    let run_id = run.id;
    let mut live = live.lock().await;
    live.remove(&run_id);
    interrupts.close();

    while let Ok(signal) = interrupts.try_recv() {
        let signal_id = signal.id();
        if run.status.is_terminal() {
            warn!(
                run_id = %run_id,
                signal_id = %signal_id,
                "run already finished, dropping interruption"
            );
        } else if let Err(e) = park_interruption(checkpoints, run_id, signal).await {
            warn!(
                run_id = %run_id,
                signal_id = %signal_id,
                error = %e,
                "could not park interruption"
            );
        }
    }

    runs.lock().await.insert(run_id, run);
}
