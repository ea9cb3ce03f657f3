//! Pipeline execution engine.
//!
//! The PipelineEngine executes pipeline steps sequentially and owns the top
//! of every run's control flow: an interruption raised by a step, or
//! delivered from another task while the run is executing, ends up here and
//! is reported on the run exactly once.

pub mod step;

use crate::checkpoint::store::{CheckpointStore, StepCheckpoint};
use crate::interrupt::listener::BufferListener;
use crate::interrupt::signal::FlowInterrupted;
use crate::state::run::{
    complete_run, create_run, fail_run, interrupt_run, log_to_run, resume_run, set_result,
    start_run, suspend_run,
};
use sk_protocol::ipc::Event;
use sk_protocol::result_models::RunResult;
use sk_protocol::run_models::{Run, RunStatus};
use step::{Pipeline, StepContext, StepError, StepOutcome};
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::{info, warn};

/// The main pipeline execution engine.
pub struct PipelineEngine {
    checkpoints: CheckpointStore,
}

impl PipelineEngine {
    /// Create a new PipelineEngine that parks suspended runs in `checkpoints`.
    pub fn new(checkpoints: CheckpointStore) -> Self {
        Self { checkpoints }
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    /// Execute a pipeline in a new run and return the final Run state.
    ///
    /// See [`PipelineEngine::run_with`].
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        events_tx: Sender<Event>,
        interrupts: &mut Receiver<FlowInterrupted>,
    ) -> Run {
        let run = create_run(pipeline.name.clone());
        self.run_with(pipeline, run, events_tx, interrupts).await
    }

    /// Execute a pipeline in an already created run.
    ///
    /// Steps run one at a time. While a step runs, the engine also listens
    /// on `interrupts`; a signal arriving there is treated exactly like one
    /// returned by the step itself.
    ///
    /// The returned run is Completed, Interrupted, Failed or Suspended. When
    /// the run finishes, `interrupts` is closed and every signal it had
    /// already accepted is reported, so a sender either gets an error or
    /// sees its signal on the run. A run whose checkpoint cannot be written
    /// ends Failed.
    pub async fn run_with(
        &self,
        pipeline: &Pipeline,
        mut run: Run,
        events_tx: Sender<Event>,
        interrupts: &mut Receiver<FlowInterrupted>,
    ) -> Run {
        let _ = events_tx
            .send(Event::RunStarted {
                run_id: run.id,
                pipeline_name: pipeline.name.clone(),
            })
            .await;

        start_run(&mut run, &events_tx).await;

        self.drive(pipeline, run, 0, &events_tx, interrupts).await
    }

    /// Continue a suspended run from its checkpoint.
    ///
    /// If an interruption was stored in the checkpoint while the run was
    /// parked, it is reported immediately and no further steps run. Only the
    /// causes that survived persistence are reported.
    pub async fn resume(
        &self,
        pipeline: &Pipeline,
        checkpoint: StepCheckpoint,
        events_tx: Sender<Event>,
        interrupts: &mut Receiver<FlowInterrupted>,
    ) -> Run {
        let StepCheckpoint {
            mut run,
            next_step,
            pending_interruption,
            ..
        } = checkpoint;

        resume_run(&mut run, &events_tx).await;

        if let Some(signal) = pending_interruption {
            return self.interrupted(run, signal, &events_tx, interrupts).await;
        }

        self.drive(pipeline, run, next_step, &events_tx, interrupts)
            .await
    }

    async fn drive(
        &self,
        pipeline: &Pipeline,
        mut run: Run,
        start: usize,
        events_tx: &Sender<Event>,
        interrupts: &mut Receiver<FlowInterrupted>,
    ) -> Run {
        for (step_index, step) in pipeline.steps.iter().enumerate().skip(start) {
            run.current_step = step_index;

            log_to_run(
                &mut run,
                events_tx,
                format!("Running step: {}", step.name()),
            )
            .await;

            let ctx = StepContext {
                run_id: run.id,
                pipeline_name: pipeline.name.clone(),
                step_index,
            };

            let outcome = tokio::select! {
                biased;
                Some(signal) = interrupts.recv() => Err(StepError::Interrupted(signal)),
                outcome = step.run(&ctx) => outcome,
            };

            match outcome.map_err(surface_interruption) {
                Ok(StepOutcome::Continue) => {
                    log_to_run(
                        &mut run,
                        events_tx,
                        format!("Step {} completed", step.name()),
                    )
                    .await;
                }
                Ok(StepOutcome::Suspend) => {
                    log_to_run(
                        &mut run,
                        events_tx,
                        format!("Suspending after step {}", step.name()),
                    )
                    .await;
                    return self.suspend(run, step_index + 1, events_tx, interrupts).await;
                }
                Err(StepError::Interrupted(signal)) => {
                    return self.interrupted(run, signal, events_tx, interrupts).await;
                }
                Err(StepError::Failed(e)) => {
                    let message = format!("Step {} failed: {e:#}", step.name());
                    return self.finish(run, Some(message), events_tx, interrupts).await;
                }
            }
        }

        self.finish(run, None, events_tx, interrupts).await
    }

    /// Park the run in a checkpoint so it can be resumed at `next_step`.
    async fn suspend(
        &self,
        mut run: Run,
        next_step: usize,
        events_tx: &Sender<Event>,
        interrupts: &mut Receiver<FlowInterrupted>,
    ) -> Run {
        run.current_step = next_step;
        let parked = Run {
            status: RunStatus::Suspended,
            ..run.clone()
        };

        if let Err(e) = self
            .checkpoints
            .save(&StepCheckpoint::new(parked, next_step))
            .await
        {
            let message = format!("Could not checkpoint run: {e}");
            return self.finish(run, Some(message), events_tx, interrupts).await;
        }

        suspend_run(&mut run, events_tx).await;
        info!(run_id = %run.id, next_step, "run suspended");
        run
    }

    /// End the run on `signal` plus any signals still queued behind it.
    async fn interrupted(
        &self,
        mut run: Run,
        signal: FlowInterrupted,
        events_tx: &Sender<Event>,
        interrupts: &mut Receiver<FlowInterrupted>,
    ) -> Run {
        let mut signals = vec![signal];
        signals.extend(close_interrupts(interrupts));

        self.report_interruptions(&mut run, &signals, events_tx)
            .await;
        self.discard_checkpoint(&run).await;
        run
    }

    /// End the run as completed, or as failed with `failure`.
    ///
    /// Signals accepted before the interrupt channel closed take precedence:
    /// the run ends Interrupted, with the failure kept in its log and result.
    async fn finish(
        &self,
        mut run: Run,
        failure: Option<String>,
        events_tx: &Sender<Event>,
        interrupts: &mut Receiver<FlowInterrupted>,
    ) -> Run {
        let pending = close_interrupts(interrupts);

        if !pending.is_empty() {
            if let Some(message) = failure {
                log_to_run(&mut run, events_tx, message).await;
                set_result(&mut run, RunResult::Failure);
            }
            self.report_interruptions(&mut run, &pending, events_tx)
                .await;
        } else if let Some(message) = failure {
            fail_run(&mut run, events_tx, message).await;
        } else {
            complete_run(&mut run, events_tx).await;
        }

        self.discard_checkpoint(&run).await;
        run
    }

    /// Record each signal on the run, copy its explanations into the run
    /// log, and move the run to Interrupted with the worst of their results.
    async fn report_interruptions(
        &self,
        run: &mut Run,
        signals: &[FlowInterrupted],
        events_tx: &Sender<Event>,
    ) {
        let Some(result) = signals
            .iter()
            .map(FlowInterrupted::result)
            .reduce(RunResult::combine)
        else {
            return;
        };

        for signal in signals {
            info!(
                run_id = %run.id,
                result = %signal.result(),
                causes = signal.causes().len(),
                "run interrupted"
            );

            let mut listener = BufferListener::new();
            signal.handle(run, &mut listener);
            for line in listener.take_lines() {
                log_to_run(run, events_tx, line).await;
            }
        }

        interrupt_run(run, events_tx, result).await;
    }

    async fn discard_checkpoint(&self, run: &Run) {
        if let Err(e) = self.checkpoints.remove(run.id).await {
            warn!(run_id = %run.id, error = %e, "could not remove checkpoint of finished run");
        }
    }
}

/// Stop accepting interrupts and take the ones already accepted.
fn close_interrupts(interrupts: &mut Receiver<FlowInterrupted>) -> Vec<FlowInterrupted> {
    interrupts.close();
    let mut pending = Vec::new();
    while let Ok(signal) = interrupts.try_recv() {
        pending.push(signal);
    }
    pending
}

/// A signal may have been carried up through `anyhow` by intermediate
/// layers. Pull it back out so it is reported as an interruption.
fn surface_interruption(error: StepError) -> StepError {
    match error {
        StepError::Failed(e) => match e.downcast::<FlowInterrupted>() {
            Ok(signal) => StepError::Interrupted(signal),
            Err(e) => StepError::Failed(e),
        },
        interrupted => interrupted,
    }
}
