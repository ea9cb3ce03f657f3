//! Custom assertion helpers over emitted events.

use sk_protocol::ipc::Event;
use sk_protocol::result_models::RunResult;
use sk_protocol::run_models::{InterruptedRunAction, Run, RunAction, RunStatus};
use std::time::Duration;
use tokio::sync::mpsc;

/// Whether a sequence of events contains a RunStatusUpdate with a specific status.
#[allow(dead_code)]
pub fn has_status_update(events: &[Event], status: RunStatus) -> bool {
    events.iter().any(|e| {
        matches!(
            e,
            Event::RunStatusUpdate {
                status: s,
                ..
            } if *s == status
        )
    })
}

/// The causes carried by the first RunInterrupted event, if any.
#[allow(dead_code)]
pub fn interrupted_event(events: &[Event]) -> Option<(RunResult, Vec<String>)> {
    events.iter().find_map(|e| match e {
        Event::RunInterrupted { result, causes, .. } => Some((*result, causes.clone())),
        _ => None,
    })
}

/// Collect events until one ends or parks the run, or the timeout passes.
#[allow(dead_code)]
pub async fn collect_events_until_settled(
    rx: &mut mpsc::Receiver<Event>,
    timeout: Duration,
) -> Vec<Event> {
    let mut events = Vec::new();
    let start = tokio::time::Instant::now();

    while start.elapsed() < timeout {
        match tokio::time::timeout(Duration::from_millis(100), rx.recv()).await {
            Ok(Some(event)) => {
                let is_settled = matches!(
                    &event,
                    Event::RunCompleted { .. }
                        | Event::RunInterrupted { .. }
                        | Event::RunError { .. }
                        | Event::RunStatusUpdate {
                            status: RunStatus::Suspended,
                            ..
                        }
                );
                events.push(event);
                if is_settled {
                    break;
                }
            }
            Ok(None) => break,  // Channel closed
            Err(_) => continue, // Timeout, keep waiting
        }
    }

    events
}

/// The single interrupted record on a run.
#[allow(dead_code)]
pub fn single_interruption(run: &Run) -> &InterruptedRunAction {
    assert_eq!(
        run.actions.len(),
        1,
        "Expected exactly one action, got: {:?}",
        run.actions
    );
    let RunAction::Interrupted(record) = &run.actions[0];
    record
}

/// Descriptions of the causes in an interrupted record, in order.
#[allow(dead_code)]
pub fn record_descriptions(record: &InterruptedRunAction) -> Vec<String> {
    record
        .causes
        .iter()
        .map(|entry| entry.description.clone())
        .collect()
}
