//! Run state machine implementation.
//!
//! This module provides functions for managing the lifecycle of a Run,
//! including state transitions, result bookkeeping and event emission.

use sk_protocol::ipc::Event;
use sk_protocol::result_models::RunResult;
use sk_protocol::run_models::{InterruptedRunAction, Run, RunAction, RunStatus};
use tokio::sync::mpsc::Sender;
use uuid::Uuid;

/// Create a new Run with Pending status.
///
/// # Arguments
///
/// * `pipeline_name` - The name of the pipeline to execute
pub fn create_run(pipeline_name: String) -> Run {
    Run {
        id: Uuid::new_v4(),
        pipeline_name,
        status: RunStatus::Pending,
        result: None,
        current_step: 0,
        logs: Vec::new(),
        actions: Vec::new(),
    }
}

async fn emit_status(run: &Run, events_tx: &Sender<Event>) {
    let _ = events_tx
        .send(Event::RunStatusUpdate {
            run_id: run.id,
            status: run.status,
            step_index: run.current_step,
        })
        .await;
}

/// Transition the run to Running status and emit event.
pub async fn start_run(run: &mut Run, events_tx: &Sender<Event>) {
    run.status = RunStatus::Running;
    emit_status(run, events_tx).await;
}

/// Transition to Suspended status and emit event.
///
/// This is called when a step parks the run and its state has been
/// checkpointed.
pub async fn suspend_run(run: &mut Run, events_tx: &Sender<Event>) {
    run.status = RunStatus::Suspended;
    emit_status(run, events_tx).await;
}

/// Resume a suspended run to Running.
pub async fn resume_run(run: &mut Run, events_tx: &Sender<Event>) {
    run.status = RunStatus::Running;
    let _ = events_tx.send(Event::RunResumed { run_id: run.id }).await;
    emit_status(run, events_tx).await;
}

/// Mark the run as completed and emit events.
///
/// The result becomes SUCCESS unless something already made it worse.
pub async fn complete_run(run: &mut Run, events_tx: &Sender<Event>) {
    set_result(run, RunResult::Success);
    run.status = RunStatus::Completed;
    emit_status(run, events_tx).await;
    let _ = events_tx
        .send(Event::RunCompleted {
            run_id: run.id,
            result: run.result.unwrap_or(RunResult::Success),
        })
        .await;
}

/// Mark the run as failed and emit error event.
///
/// # Arguments
///
/// * `run` - The run to fail
/// * `events_tx` - Channel to send error event
/// * `error` - Error message describing the failure
pub async fn fail_run(run: &mut Run, events_tx: &Sender<Event>, error: String) {
    set_result(run, RunResult::Failure);
    run.status = RunStatus::Failed;
    emit_status(run, events_tx).await;
    let _ = events_tx
        .send(Event::RunError {
            run_id: run.id,
            error,
        })
        .await;
}

/// Mark the run as interrupted and emit event.
///
/// Expects the interruption to have been reported on the run already; the
/// event carries the causes of the most recent interrupted record.
pub async fn interrupt_run(run: &mut Run, events_tx: &Sender<Event>, result: RunResult) {
    set_result(run, result);
    run.status = RunStatus::Interrupted;
    emit_status(run, events_tx).await;

    let causes = interruption_records(run)
        .last()
        .map(|record| {
            record
                .causes
                .iter()
                .map(|entry| entry.description.clone())
                .collect()
        })
        .unwrap_or_default();

    let _ = events_tx
        .send(Event::RunInterrupted {
            run_id: run.id,
            result: run.result.unwrap_or(result),
            causes,
        })
        .await;
}

/// Append a log message to the run logs and emit event.
pub async fn log_to_run(run: &mut Run, events_tx: &Sender<Event>, message: String) {
    run.logs.push(message.clone());
    let _ = events_tx
        .send(Event::RunLogChunk {
            run_id: run.id,
            content: message,
        })
        .await;
}

/// Record a result on the run. A result can only get worse.
pub fn set_result(run: &mut Run, result: RunResult) {
    run.result = Some(match run.result {
        Some(current) => current.combine(result),
        None => result,
    });
}

/// Append an action to the run's durable action list.
pub fn add_action(run: &mut Run, action: RunAction) {
    run.actions.push(action);
}

/// All interrupted records attached to the run, oldest first.
pub fn interruption_records(run: &Run) -> Vec<&InterruptedRunAction> {
    run.actions
        .iter()
        .map(|action| match action {
            RunAction::Interrupted(record) => record,
        })
        .collect()
}

/// Whether a signal with this id has already been reported on the run.
pub fn has_interruption_record(run: &Run, signal_id: Uuid) -> bool {
    interruption_records(run)
        .iter()
        .any(|record| record.signal_id == signal_id)
}
