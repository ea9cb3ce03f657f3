//! Test fixtures: steps, causes, pipelines and project directories.

use async_trait::async_trait;
use sk_core::engine::step::{Pipeline, Step, StepContext, StepOutcome, StepResult};
use sk_core::interrupt::cause::Cause;
use sk_core::interrupt::signal::FlowInterrupted;
use sk_core::state::manager::StateManager;
use sk_protocol::result_models::RunResult;
use sk_protocol::run_models::Run;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

/// A cause that exists only in memory.
#[allow(dead_code)]
#[derive(Debug)]
pub struct DebugMarker;

impl Cause for DebugMarker {
    fn short_description(&self) -> String {
        "debug-only-marker".to_string()
    }
}

/// A step that does nothing.
#[allow(dead_code)]
pub struct NoopStep(pub &'static str);

#[async_trait]
impl Step for NoopStep {
    fn name(&self) -> &str {
        self.0
    }

    async fn run(&self, _ctx: &StepContext) -> StepResult<StepOutcome> {
        Ok(StepOutcome::Continue)
    }
}

/// A step that parks the run.
#[allow(dead_code)]
pub struct SuspendStep(pub &'static str);

#[async_trait]
impl Step for SuspendStep {
    fn name(&self) -> &str {
        self.0
    }

    async fn run(&self, _ctx: &StepContext) -> StepResult<StepOutcome> {
        Ok(StepOutcome::Suspend)
    }
}

/// A step that interrupts its own flow.
#[allow(dead_code)]
pub struct InterruptStep {
    pub result: RunResult,
    pub causes: Vec<Arc<dyn Cause>>,
}

#[async_trait]
impl Step for InterruptStep {
    fn name(&self) -> &str {
        "interrupt"
    }

    async fn run(&self, _ctx: &StepContext) -> StepResult<StepOutcome> {
        Err(FlowInterrupted::new(self.result, self.causes.clone()).into())
    }
}

/// A step that signals it has started and then never finishes on its own.
#[allow(dead_code)]
pub struct BlockingStep {
    pub started: Arc<Notify>,
}

#[async_trait]
impl Step for BlockingStep {
    fn name(&self) -> &str {
        "blocking"
    }

    async fn run(&self, _ctx: &StepContext) -> StepResult<StepOutcome> {
        self.started.notify_one();
        std::future::pending::<()>().await;
        Ok(StepOutcome::Continue)
    }
}

/// Build a pipeline from steps.
#[allow(dead_code)]
pub fn create_test_pipeline(name: &str, steps: Vec<Arc<dyn Step>>) -> Pipeline {
    Pipeline::new(name, steps)
}

/// Create a temporary project directory with a `.stepkit/config.toml`.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let sk_dir = temp_dir.path().join(".stepkit");
    std::fs::create_dir_all(&sk_dir)?;
    std::fs::write(
        sk_dir.join("config.toml"),
        "checkpoint-dir = \"state/checkpoints\"\nevent-buffer = 32\n",
    )?;
    Ok(temp_dir)
}

/// A state manager over a fresh temporary project.
#[allow(dead_code)]
pub async fn create_test_manager() -> (StateManager, mpsc::Receiver<sk_protocol::ipc::Event>, TempDir)
{
    let project = create_test_project().unwrap();
    let config = sk_core::config::loader::load_config(project.path())
        .await
        .unwrap();
    let (tx, rx) = mpsc::channel(256);
    (StateManager::new(&config, tx), rx, project)
}

/// Wait until the manager has settled the run (finished or suspended).
#[allow(dead_code)]
pub async fn wait_settled(manager: &StateManager, run_id: Uuid) -> Run {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if !manager.is_live(run_id).await {
            if let Some(run) = manager.get_run(run_id).await {
                return run;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "run {run_id} did not settle in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
