//! Events emitted by the core while runs execute.
//!
//! Events flow from the engine to whoever observes it (a UI, a log shipper,
//! a test) over an asynchronous channel, so execution never waits on the
//! observer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::result_models::RunResult;
use crate::run_models::RunStatus;

/// Events sent from the core to observers.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "runInterrupted",
///   "payload": {
///     "run_id": "uuid-here",
///     "result": "ABORTED",
///     "causes": ["Aborted by alice"]
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A new run has been started.
    RunStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        pipeline_name: String,
    },

    /// A run's status has changed.
    RunStatusUpdate {
        #[ts(type = "string")]
        run_id: Uuid,
        status: RunStatus,
        step_index: usize,
    },

    /// A run has produced new log output.
    RunLogChunk {
        #[ts(type = "string")]
        run_id: Uuid,
        content: String,
    },

    /// A run finished all of its steps.
    RunCompleted {
        #[ts(type = "string")]
        run_id: Uuid,
        result: RunResult,
    },

    /// A run failed with an error.
    RunError {
        #[ts(type = "string")]
        run_id: Uuid,
        error: String,
    },

    /// An interruption signal was reported on a run.
    ///
    /// `causes` holds the short descriptions in reporting order.
    RunInterrupted {
        #[ts(type = "string")]
        run_id: Uuid,
        result: RunResult,
        causes: Vec<String>,
    },

    /// A suspended run was picked up again from its checkpoint.
    RunResumed {
        #[ts(type = "string")]
        run_id: Uuid,
    },
}
