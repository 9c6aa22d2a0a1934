//! Pipeline driver.
//!
//! The orchestrator owns the task state machine. For each task it runs
//! planner → researcher → writer → reviewer, with at most one extra
//! writer → reviewer pass when the first review asks for revision.
//!
//! Every step follows the same commit discipline:
//! 1. move the task to the step's status and commit, so observers see the
//!    step as in progress
//! 2. run the agent (may suspend)
//! 3. append its result and commit
//! 4. sleep for the pacing delay
//!
//! An agent error aborts the rest of the pipeline. The failure is recorded as
//! a synthetic `Orchestrator` result and the task ends `FAILED`. Nothing is
//! retried and failures are never reported back to the submitter.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::agents::{mark_revision, revision_request, AgentRef, AgentSet, NEEDS_REVISION};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::stream::{poll_stream, push_stream, StreamMode, TaskStream};
use crate::task::{AgentResult, Task, TaskId, TaskStatus, TaskStore};

/// Agent name used for failure records the orchestrator writes itself.
pub const ORCHESTRATOR_AGENT: &str = "Orchestrator";
pub const FAILED: &str = "FAILED";

/// Default pause between pipeline steps.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Pause after each step so slow observers can see intermediate states.
    pub step_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
        }
    }
}

impl PipelineConfig {
    /// No pacing; for tests and batch use.
    pub fn immediate() -> Self {
        Self {
            step_delay: Duration::ZERO,
        }
    }
}

pub struct Orchestrator {
    store: TaskStore,
    agents: AgentSet,
    config: PipelineConfig,
    stream_mode: StreamMode,
    shutdown: CancellationToken,
}

impl Orchestrator {
    pub fn new(store: TaskStore, agents: AgentSet, config: PipelineConfig) -> Self {
        Self {
            store,
            agents,
            config,
            stream_mode: StreamMode::default(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_stream_mode(mut self, mode: StreamMode) -> Self {
        self.stream_mode = mode;
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn stream_mode(&self) -> StreamMode {
        self.stream_mode
    }

    /// Validate `request`, register a `Pending` task and start its pipeline
    /// in the background. Returns as soon as the task is registered.
    pub async fn create_task(self: &Arc<Self>, request: &str) -> OrchestratorResult<TaskId> {
        let task = self.register_task(request).await?;
        let id = task.id();

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            orchestrator.run_task(id).await;
        });

        Ok(id)
    }

    /// Validate `request` and register a `Pending` task without running it.
    pub async fn register_task(&self, request: &str) -> OrchestratorResult<Task> {
        if request.is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "Field 'request' must be a non-empty string.".to_string(),
            ));
        }
        let task = self.store.create(request).await;
        tracing::info!(task_id = %task.id(), "Created task");
        Ok(task)
    }

    pub async fn get_task(&self, id: TaskId) -> OrchestratorResult<Task> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| OrchestratorError::NotFound(id.to_string()))
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.store.list().await
    }

    /// Live feed of snapshots for `id`; see [`crate::stream`] for the contract.
    pub async fn subscribe_task(&self, id: TaskId) -> OrchestratorResult<TaskStream> {
        let not_found = || OrchestratorError::NotFound(id.to_string());
        match self.stream_mode {
            StreamMode::Push => {
                let rx = self.store.subscribe(id).await.ok_or_else(not_found)?;
                Ok(push_stream(rx))
            }
            StreamMode::Poll { interval } => {
                if self.store.get(id).await.is_none() {
                    return Err(not_found());
                }
                Ok(poll_stream(self.store.clone(), id, interval))
            }
        }
    }

    /// Cancel every running pipeline at its next suspension point.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Drive task `id` to a terminal state.
    ///
    /// Does nothing if the task is unknown or no longer `Pending`.
    pub async fn run_task(&self, id: TaskId) {
        let span = tracing::info_span!("pipeline", task_id = %id);
        self.run_task_inner(id).instrument(span).await
    }

    async fn run_task_inner(&self, id: TaskId) {
        let Some(mut task) = self.store.get(id).await else {
            tracing::warn!("Task not found, nothing to run");
            return;
        };
        if task.status() != TaskStatus::Pending {
            tracing::warn!(status = %task.status(), "Task already started, skipping");
            return;
        }

        let cancel = self.shutdown.child_token();
        match self.drive(&mut task, &cancel).await {
            Ok(()) => {
                tracing::info!(results = task.agent_results().len(), "Task completed");
            }
            Err(e) => {
                tracing::warn!(status = %task.status(), "Pipeline failed: {:#}", e);
                self.record_failure(task, &e).await;
            }
        }
    }

    async fn drive(&self, task: &mut Task, cancel: &CancellationToken) -> anyhow::Result<()> {
        let agents = self.agents.clone();

        let request = task.request().to_string();
        let plan = self
            .step(task, TaskStatus::Planning, &agents.planner, request, cancel)
            .await?;
        let research = self
            .step(task, TaskStatus::Researching, &agents.researcher, plan.output, cancel)
            .await?;
        let draft = self
            .step(task, TaskStatus::Writing, &agents.writer, research.output, cancel)
            .await?;
        let review = self
            .step(task, TaskStatus::Reviewing, &agents.reviewer, draft.output.clone(), cancel)
            .await?;

        // At most one revision cycle. The second review sees the revision
        // marker and approves, so its verdict is not consulted.
        let report = if review.status == NEEDS_REVISION {
            tracing::info!("Reviewer requested revision");
            let revised = self
                .step(
                    task,
                    TaskStatus::Revising,
                    &agents.writer,
                    revision_request(&draft.output, &review.output),
                    cancel,
                )
                .await?;
            self.step(
                task,
                TaskStatus::Reviewing,
                &agents.reviewer,
                mark_revision(&revised.output),
                cancel,
            )
            .await?;
            revised.output
        } else {
            draft.output
        };

        task.complete(report)?;
        self.store.commit(task.clone()).await?;
        Ok(())
    }

    async fn step(
        &self,
        task: &mut Task,
        status: TaskStatus,
        agent: &AgentRef,
        input: String,
        cancel: &CancellationToken,
    ) -> anyhow::Result<AgentResult> {
        task.advance(status)?;
        self.store.commit(task.clone()).await?;
        tracing::debug!(status = %status, agent = agent.name(), "Entering step");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => bail!("cancelled"),
            result = agent.run(&input) => result?,
        };
        tracing::info!(
            agent = %result.agent_name,
            outcome = %result.status,
            "Step finished"
        );

        task.push_result(result.clone())?;
        self.store.commit(task.clone()).await?;

        self.pace(cancel).await?;
        Ok(result)
    }

    async fn pace(&self, cancel: &CancellationToken) -> anyhow::Result<()> {
        if self.config.step_delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => bail!("cancelled"),
            _ = tokio::time::sleep(self.config.step_delay) => Ok(()),
        }
    }

    async fn record_failure(&self, mut task: Task, error: &anyhow::Error) {
        if task.is_terminal() {
            return;
        }
        let failure = AgentResult::new(
            ORCHESTRATOR_AGENT,
            FAILED,
            task.request(),
            format!("Pipeline failed: {}", error),
        );
        if let Err(e) = task.fail(failure) {
            tracing::error!("Could not mark task as failed: {}", e);
            return;
        }
        if let Err(e) = self.store.commit(task).await {
            tracing::error!("Could not store failed task: {}", e);
        }
    }
}
