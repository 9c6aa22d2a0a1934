//! HTTP transport over the orchestrator.
//!
//! A thin wrapper: handlers validate payload shape, call the orchestrator's
//! boundary operations and map its errors to status codes.

mod error;
mod routes;
mod tasks;

pub use routes::{app, serve, AppState};
pub use tasks::{CreateTaskRequest, CreateTaskResponse};
