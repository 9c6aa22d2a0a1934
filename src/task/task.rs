//! Task types and the lifecycle state machine.
//!
//! Invariants enforced here:
//! - `final_report` is `Some` if and only if `status == Done`
//! - `agent_results` is append-only; order is execution order
//! - Terminal tasks (`Done`, `Failed`) accept no further transitions or results

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// Opaque task identifier, rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    /// Accepts both the simple (hex) and hyphenated forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of a task.
///
/// ```text
/// PENDING → PLANNING → RESEARCHING → WRITING → REVIEWING ─┬─────────────→ DONE
///                                                 ▲       └→ REVISING ─┐
///                                                 └────────────────────┘
/// any non-terminal state → FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Planning,
    Researching,
    Writing,
    Reviewing,
    Revising,
    Done,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `self → next` is an edge of the lifecycle graph.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;

        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Planning)
                | (Planning, Researching)
                | (Researching, Writing)
                | (Writing, Reviewing)
                | (Reviewing, Revising)
                | (Revising, Reviewing)
                | (Reviewing, Done)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Planning => "PLANNING",
            Self::Researching => "RESEARCHING",
            Self::Writing => "WRITING",
            Self::Reviewing => "REVIEWING",
            Self::Revising => "REVISING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one agent execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_name: String,
    /// Agent-specific outcome tag, e.g. "APPROVED" or "NEEDS_REVISION"
    pub status: String,
    pub input: String,
    pub output: String,
    pub timestamp: DateTime<Utc>,
}

impl AgentResult {
    pub fn new(
        agent_name: impl Into<String>,
        status: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            status: status.into(),
            input: input.into(),
            output: output.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Invalid status transition {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("Task is already in terminal state {0}")]
    Terminal(TaskStatus),

    #[error("Final report must not be empty")]
    EmptyReport,
}

/// One end-to-end pipeline execution.
///
/// Fields are read-only from outside this module; all mutation goes through
/// the transition methods so the invariants above cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    request: String,
    status: TaskStatus,
    agent_results: Vec<AgentResult>,
    final_report: Option<String>,
    created_at: DateTime<Utc>,
}

impl Task {
    /// Create a fresh `Pending` task.
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            request: request.into(),
            status: TaskStatus::Pending,
            agent_results: Vec::new(),
            final_report: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn request(&self) -> &str {
        &self.request
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn agent_results(&self) -> &[AgentResult] {
        &self.agent_results
    }

    pub fn final_report(&self) -> Option<&str> {
        self.final_report.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to a non-terminal `next` state.
    ///
    /// `Done` must go through [`Task::complete`] and `Failed` through
    /// [`Task::fail`], since both carry data with them.
    pub fn advance(&mut self, next: TaskStatus) -> Result<(), TaskError> {
        if next.is_terminal() {
            return Err(TaskError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.transition(next)
    }

    pub fn push_result(&mut self, result: AgentResult) -> Result<(), TaskError> {
        if self.is_terminal() {
            return Err(TaskError::Terminal(self.status));
        }
        self.agent_results.push(result);
        Ok(())
    }

    /// Finish successfully with the given report.
    pub fn complete(&mut self, report: impl Into<String>) -> Result<(), TaskError> {
        let report = report.into();
        if report.is_empty() {
            return Err(TaskError::EmptyReport);
        }
        self.transition(TaskStatus::Done)?;
        self.final_report = Some(report);
        Ok(())
    }

    /// Record the synthetic failure result and move to `Failed` in one step.
    pub fn fail(&mut self, failure: AgentResult) -> Result<(), TaskError> {
        self.push_result(failure)?;
        self.transition(TaskStatus::Failed)
    }

    fn transition(&mut self, next: TaskStatus) -> Result<(), TaskError> {
        if self.is_terminal() {
            return Err(TaskError::Terminal(self.status));
        }
        if !self.status.can_transition_to(next) {
            return Err(TaskError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str) -> AgentResult {
        AgentResult::new(name, "OK", "in", "out")
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new("hello");
        assert_eq!(task.status(), TaskStatus::Pending);
        assert!(task.agent_results().is_empty());
        assert!(task.final_report().is_none());
        assert_eq!(task.request(), "hello");
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut task = Task::new("hello");
        for next in [
            TaskStatus::Planning,
            TaskStatus::Researching,
            TaskStatus::Writing,
            TaskStatus::Reviewing,
            TaskStatus::Revising,
            TaskStatus::Reviewing,
        ] {
            task.advance(next).unwrap();
            task.push_result(result("Agent")).unwrap();
        }
        task.complete("report").unwrap();

        assert_eq!(task.status(), TaskStatus::Done);
        assert_eq!(task.final_report(), Some("report"));
        assert_eq!(task.agent_results().len(), 6);
    }

    #[test]
    fn test_skipping_states_is_rejected() {
        let mut task = Task::new("hello");
        let err = task.advance(TaskStatus::Writing).unwrap_err();
        assert_eq!(
            err,
            TaskError::InvalidTransition {
                from: TaskStatus::Pending,
                to: TaskStatus::Writing
            }
        );

        // Done only reachable from Reviewing
        task.advance(TaskStatus::Planning).unwrap();
        assert!(task.complete("report").is_err());
        assert!(task.final_report().is_none());
    }

    #[test]
    fn test_advance_refuses_terminal_targets() {
        let mut task = Task::new("hello");
        assert!(task.advance(TaskStatus::Failed).is_err());
        assert!(task.advance(TaskStatus::Done).is_err());
        assert_eq!(task.status(), TaskStatus::Pending);
    }

    #[test]
    fn test_terminal_task_is_frozen() {
        let mut task = Task::new("hello");
        task.advance(TaskStatus::Planning).unwrap();
        task.fail(result("Orchestrator")).unwrap();

        assert_eq!(task.status(), TaskStatus::Failed);
        assert_eq!(
            task.push_result(result("Late")),
            Err(TaskError::Terminal(TaskStatus::Failed))
        );
        assert!(task.fail(result("Again")).is_err());
        assert_eq!(task.agent_results().len(), 1);
        assert!(task.final_report().is_none());
    }

    #[test]
    fn test_empty_report_rejected() {
        let mut task = Task::new("hello");
        for next in [
            TaskStatus::Planning,
            TaskStatus::Researching,
            TaskStatus::Writing,
            TaskStatus::Reviewing,
        ] {
            task.advance(next).unwrap();
        }
        assert_eq!(task.complete(""), Err(TaskError::EmptyReport));
        assert_eq!(task.status(), TaskStatus::Reviewing);
    }

    #[test]
    fn test_wire_format() {
        let task = Task::new("hello");
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["final_report"], serde_json::Value::Null);
        assert!(json["agent_results"].as_array().unwrap().is_empty());
        let id = json["id"].as_str().unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(json.get("created_at").is_some());
    }

    #[test]
    fn test_task_id_parses_both_forms() {
        let id = TaskId::new();
        let simple: TaskId = id.to_string().parse().unwrap();
        let hyphenated: TaskId = id.0.hyphenated().to_string().parse().unwrap();
        assert_eq!(simple, id);
        assert_eq!(hyphenated, id);
        assert!("not-an-id".parse::<TaskId>().is_err());
    }
}
