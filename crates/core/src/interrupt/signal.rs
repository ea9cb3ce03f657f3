//! The interruption signal raised to stop a step execution from the inside.
//!
//! [`FlowInterrupted`] is returned as an error out of step code and travels
//! up unmodified until something that owns the run catches it and calls
//! [`FlowInterrupted::handle`]. Intermediate layers may inspect it, pass it
//! on with `?`, or swallow it on purpose.
//!
//! Unlike an interruption tied to the worker executing the run, this signal
//! can be raised and handled from any task.
//!
//! The signal may be checkpointed while its execution is suspended. Only
//! persistable causes are written out; on load the visible cause list is
//! rebuilt from what was persisted, so causes that could not be persisted are
//! gone for good.

use crate::interrupt::cause::Cause;
use crate::interrupt::listener::TaskListener;
use crate::state::run::{add_action, has_interruption_record};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sk_protocol::cause_models::CauseOfInterruption;
use sk_protocol::result_models::RunResult;
use sk_protocol::run_models::{CauseEntry, InterruptedRunAction, Run, RunAction};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Signal that a flow was interrupted, carrying the result the run should
/// adopt and the causes explaining why.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[error("flow interrupted with result {result}")]
#[serde(from = "PersistedSignal", into = "PersistedSignal")]
pub struct FlowInterrupted {
    id: Uuid,
    result: RunResult,
    /// Persistable subset, in supplied order. This is what gets written out.
    causes: Vec<CauseOfInterruption>,
    /// Every cause currently visible. Never persisted; rebuilt on load.
    all_causes: Vec<Arc<dyn Cause>>,
}

/// What a [`FlowInterrupted`] looks like on disk.
#[derive(Serialize, Deserialize)]
struct PersistedSignal {
    id: Uuid,
    result: RunResult,
    #[serde(default)]
    causes: Vec<CauseOfInterruption>,
}

impl FlowInterrupted {
    /// Create a new signal.
    ///
    /// Causes without a persisted form are kept in [`causes`](Self::causes)
    /// but left out of the persisted subset, with a warning naming their
    /// type. Construction never fails, and an empty cause list is fine.
    ///
    /// # Arguments
    ///
    /// * `result` - The desired result for the run, typically `ABORTED`
    /// * `causes` - Explanations for the interruption, in order
    pub fn new(result: RunResult, causes: Vec<Arc<dyn Cause>>) -> Self {
        let mut persistable = Vec::with_capacity(causes.len());
        for cause in &causes {
            match cause.persisted_form() {
                Some(persisted) => persistable.push(persisted),
                None => warn!(
                    cause_type = cause.type_name(),
                    "non-persistable cause of interruption will not survive a checkpoint"
                ),
            }
        }

        Self {
            id: Uuid::new_v4(),
            result,
            causes: persistable,
            all_causes: causes,
        }
    }

    /// Shorthand for a single persistable cause.
    pub fn from_cause(result: RunResult, cause: CauseOfInterruption) -> Self {
        Self::new(result, vec![Arc::new(cause)])
    }

    /// Identity of this signal. Survives persistence.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn result(&self) -> RunResult {
        self.result
    }

    /// All causes currently visible.
    ///
    /// Before the signal is persisted this is everything passed to
    /// [`new`](Self::new); after a reload it is only the persisted subset.
    pub fn causes(&self) -> &[Arc<dyn Cause>] {
        &self.all_causes
    }

    /// The subset of causes that is written when the signal is persisted.
    pub fn persisted_causes(&self) -> &[CauseOfInterruption] {
        &self.causes
    }

    /// Report this interruption on `run`.
    ///
    /// Attaches an interrupted record holding every visible cause, then
    /// prints each cause to `listener` in order. Whoever catches the signal
    /// at the top of the run should call this once. Reporting the same
    /// signal twice on one run is a no-op: the record is keyed on
    /// [`id`](Self::id).
    pub fn handle(&self, run: &mut Run, listener: &mut dyn TaskListener) {
        if has_interruption_record(run, self.id) {
            debug!(
                run_id = %run.id,
                signal_id = %self.id,
                "interruption already reported on this run"
            );
            return;
        }

        let causes = self
            .all_causes
            .iter()
            .map(|cause| CauseEntry {
                kind: cause.type_name().to_string(),
                description: cause.short_description(),
                cause: cause.persisted_form(),
            })
            .collect();

        add_action(
            run,
            RunAction::Interrupted(InterruptedRunAction {
                signal_id: self.id,
                result: self.result,
                causes,
                recorded_at: Utc::now(),
            }),
        );

        for cause in &self.all_causes {
            cause.print(listener);
        }
    }
}

impl From<PersistedSignal> for FlowInterrupted {
    fn from(persisted: PersistedSignal) -> Self {
        let all_causes = persisted
            .causes
            .iter()
            .cloned()
            .map(|cause| Arc::new(cause) as Arc<dyn Cause>)
            .collect();

        Self {
            id: persisted.id,
            result: persisted.result,
            causes: persisted.causes,
            all_causes,
        }
    }
}

impl From<FlowInterrupted> for PersistedSignal {
    fn from(signal: FlowInterrupted) -> Self {
        Self {
            id: signal.id,
            result: signal.result,
            causes: signal.causes,
        }
    }
}
