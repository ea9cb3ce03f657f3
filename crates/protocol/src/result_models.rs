//! Terminal outcome models.
//!
//! A run ends with exactly one [`RunResult`]. Results are ordered from best
//! to worst so that several contributing outcomes can be folded into one.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// The closed set of outcomes a run can adopt when it stops.
///
/// Variants are declared from best to worst; the derived ordering is the
/// severity ordering used by [`RunResult::combine`].
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunResult {
    /// Every step completed without problems.
    Success,

    /// The run completed but something was flagged as unhealthy.
    Unstable,

    /// The run hit a fatal error.
    Failure,

    /// The run never got far enough to produce an outcome.
    NotBuilt,

    /// The run was interrupted before it finished.
    Aborted,
}

impl RunResult {
    /// Returns true if `self` is strictly more severe than `other`.
    pub fn is_worse_than(self, other: RunResult) -> bool {
        self > other
    }

    pub fn is_better_or_equal_to(self, other: RunResult) -> bool {
        self <= other
    }

    /// Returns the more severe of the two results.
    pub fn combine(self, other: RunResult) -> RunResult {
        self.max(other)
    }

    /// Whether a run with this result actually ran to completion.
    pub fn is_complete_build(self) -> bool {
        matches!(
            self,
            RunResult::Success | RunResult::Unstable | RunResult::Failure
        )
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunResult::Success => "SUCCESS",
            RunResult::Unstable => "UNSTABLE",
            RunResult::Failure => "FAILURE",
            RunResult::NotBuilt => "NOT_BUILT",
            RunResult::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}
