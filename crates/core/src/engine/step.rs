//! The step abstraction executed by the engine.

use crate::interrupt::signal::FlowInterrupted;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors a step can return.
#[derive(Error, Debug)]
pub enum StepError {
    /// The step asked for the flow to be interrupted.
    ///
    /// Propagates unchanged up to the engine, which reports it on the run.
    #[error(transparent)]
    Interrupted(#[from] FlowInterrupted),

    /// The step failed.
    #[error("step failed: {0:#}")]
    Failed(#[from] anyhow::Error),
}

/// Type alias for Result with StepError.
pub type StepResult<T> = Result<T, StepError>;

/// What the engine should do after a step returns successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Go on with the next step.
    Continue,

    /// Park the run. The engine checkpoints it and resumes from the next
    /// step later.
    Suspend,
}

/// Information handed to a step while it executes.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub run_id: Uuid,
    pub pipeline_name: String,
    pub step_index: usize,
}

/// A unit of work within a pipeline.
#[async_trait]
pub trait Step: Send + Sync {
    /// Name used in run logs.
    fn name(&self) -> &str;

    async fn run(&self, ctx: &StepContext) -> StepResult<StepOutcome>;
}

/// An ordered list of steps.
#[derive(Clone)]
pub struct Pipeline {
    pub name: String,
    pub steps: Vec<Arc<dyn Step>>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, steps: Vec<Arc<dyn Step>>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field(
                "steps",
                &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
