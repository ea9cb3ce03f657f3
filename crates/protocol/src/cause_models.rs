//! Persistable causes of interruption.
//!
//! These are the explanations that can be written to a checkpoint or a run
//! record and read back without loss. Causes that only make sense in memory
//! live in `sk-core` and are never part of this enum.

use crate::result_models::RunResult;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A durable explanation of why a run was interrupted.
///
/// Serialized with an internal `type` tag:
/// ```json
/// { "type": "userInterruption", "user": "alice" }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CauseOfInterruption {
    /// Someone asked for the run to stop.
    UserInterruption { user: String },

    /// A configured time limit elapsed.
    Timeout { limit_secs: u64 },

    /// Another run this one depends on ended badly.
    UpstreamFailure { upstream: String, result: RunResult },

    /// Free-form explanation supplied by the caller.
    Custom { description: String },
}

impl CauseOfInterruption {
    pub fn user(user: impl Into<String>) -> Self {
        CauseOfInterruption::UserInterruption { user: user.into() }
    }

    pub fn custom(description: impl Into<String>) -> Self {
        CauseOfInterruption::Custom {
            description: description.into(),
        }
    }

    /// One-line, human-readable explanation.
    pub fn short_description(&self) -> String {
        match self {
            CauseOfInterruption::UserInterruption { user } => format!("Aborted by {user}"),
            CauseOfInterruption::Timeout { .. } => "Timeout has been exceeded".to_string(),
            CauseOfInterruption::UpstreamFailure { upstream, result } => {
                format!("Upstream {upstream} finished with result {result}")
            }
            CauseOfInterruption::Custom { description } => description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_descriptions() {
        assert_eq!(
            CauseOfInterruption::user("alice").short_description(),
            "Aborted by alice"
        );
        assert_eq!(
            CauseOfInterruption::Timeout { limit_secs: 30 }.short_description(),
            "Timeout has been exceeded"
        );
        assert_eq!(
            CauseOfInterruption::UpstreamFailure {
                upstream: "build-libs".to_string(),
                result: RunResult::Failure,
            }
            .short_description(),
            "Upstream build-libs finished with result FAILURE"
        );
        assert_eq!(
            CauseOfInterruption::custom("user-abort").short_description(),
            "user-abort"
        );
    }

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_value(CauseOfInterruption::user("bob")).unwrap();
        assert_eq!(json["type"], "userInterruption");
        assert_eq!(json["user"], "bob");
    }
}
