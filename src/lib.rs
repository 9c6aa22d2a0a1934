//! # Agent Orchestrator
//!
//! Runs free-form requests through a fixed pipeline of agents and exposes the
//! evolving task to clients by lookup or live stream.
//!
//! ## Architecture
//!
//! ```text
//!   POST /tasks ──► Orchestrator::create_task ──► TaskStore (PENDING)
//!                         │
//!                         ▼ tokio::spawn
//!   ┌─────────┐   ┌────────────┐   ┌────────┐   ┌──────────┐
//!   │ Planner │──►│ Researcher │──►│ Writer │──►│ Reviewer │──► DONE
//!   └─────────┘   └────────────┘   └────────┘   └────┬─────┘
//!                                       ▲             │ NEEDS_REVISION (once)
//!                                       └─────────────┘
//!
//!   every step commits to the TaskStore ──► subscribers (SSE)
//! ```
//!
//! ## Modules
//! - `task`: Task record, lifecycle state machine, in-memory store
//! - `agents`: Agent trait and the four built-in agents
//! - `orchestrator`: pipeline driver and boundary operations
//! - `stream`: push and poll snapshot feeds
//! - `api`: axum HTTP layer
//! - `config`: environment configuration
//!
//! State lives in process memory only; a restart loses every task.

pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod stream;
pub mod task;

pub use config::Config;
pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, PipelineConfig};
pub use task::{AgentResult, Task, TaskId, TaskStatus, TaskStore};
