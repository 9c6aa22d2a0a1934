//! Task module - the task record, its lifecycle state machine, and the shared store.
//!
//! This module is designed around a few hard invariants:
//! - Status only moves along the edges of the lifecycle graph
//! - Agent results are append-only and frozen once the task is terminal
//! - The store only ever swaps whole `Task` values, never individual fields

#[allow(clippy::module_inception)]
mod task;
mod store;

pub use store::{StoreError, TaskStore};
pub use task::{AgentResult, Task, TaskError, TaskId, TaskStatus};
