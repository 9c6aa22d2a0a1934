//! Errors surfaced synchronously at the orchestrator boundary.
//!
//! Failures inside a running pipeline never show up here; they are recorded on
//! the task itself and observed by reading or streaming it.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Task {0} not found")]
    NotFound(String),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
