//! Durable run record models.
//!
//! A [`Run`] is the record of one execution of a pipeline. It owns the
//! terminal result and an append-only list of [`RunAction`]s attached while
//! the run executes.

use crate::cause_models::CauseOfInterruption;
use crate::result_models::RunResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Represents the current lifecycle status of a run.
///
/// Normal progression: Pending -> Running -> Completed
///
/// Other states:
/// - Suspended: a step parked the run; its state lives in a checkpoint
/// - Interrupted: an interruption signal reached the top of the run
/// - Failed: a step returned an error that was not an interruption
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Run has been created but not started yet.
    Pending,

    /// Run is actively executing steps.
    Running,

    /// Run is parked and can be resumed from its checkpoint.
    Suspended,

    /// Run was stopped by an interruption signal.
    Interrupted,

    /// Run finished all of its steps.
    Completed,

    /// Run failed due to an error.
    Failed,
}

impl RunStatus {
    /// Whether the run can make no further progress.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Interrupted | RunStatus::Completed | RunStatus::Failed
        )
    }
}

/// One cause as it was recorded on a run.
///
/// Every cause gets a kind and a description. The structured `cause` is only
/// present when the cause could be persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct CauseEntry {
    /// Concrete type name of the cause that produced this entry.
    pub kind: String,

    /// Human-readable explanation at the time of recording.
    pub description: String,

    /// Structured form, if the cause is persistable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<CauseOfInterruption>,
}

/// Durable record of an interruption having been reported on a run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct InterruptedRunAction {
    /// Identity of the signal that was reported.
    ///
    /// A run never holds two records with the same signal id.
    #[ts(type = "string")]
    pub signal_id: Uuid,

    /// Outcome the signal asked the run to adopt.
    pub result: RunResult,

    /// All causes visible when the signal was reported, in order.
    pub causes: Vec<CauseEntry>,

    #[ts(type = "string")]
    pub recorded_at: DateTime<Utc>,
}

/// An entry in a run's append-only action list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum RunAction {
    Interrupted(InterruptedRunAction),
}

/// Represents the durable state of a single pipeline run.
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct Run {
    /// Unique identifier for this run.
    #[ts(type = "string")]
    pub id: Uuid,

    /// Name of the pipeline being executed.
    pub pipeline_name: String,

    /// Current execution status.
    pub status: RunStatus,

    /// Terminal outcome, once one has been decided.
    #[serde(default)]
    pub result: Option<RunResult>,

    /// Zero-based index of the step currently being executed, or the next
    /// step to execute while suspended.
    pub current_step: usize,

    /// Accumulated log lines from this run.
    #[serde(default)]
    pub logs: Vec<String>,

    /// Append-only list of actions attached to the run.
    #[serde(default)]
    pub actions: Vec<RunAction>,
}
