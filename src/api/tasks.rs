//! Task API endpoints.
//!
//! - `POST /tasks` - submit a request, returns the new task id
//! - `GET /tasks` - list every task
//! - `GET /tasks/:id` - current snapshot
//! - `GET /tasks/:id/stream` - SSE feed of snapshots until the task is terminal

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
    routing::get,
    Router,
};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::routes::AppState;
use crate::error::OrchestratorError;
use crate::task::{Task, TaskId};

/// Create task routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task))
        .route("/:id/stream", get(stream_task))
}

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /tasks`. `request` is kept loosely typed so a non-string
/// value is reported as invalid input rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub request: Option<Value>,
}

impl CreateTaskRequest {
    pub fn request_text(&self) -> Result<&str, OrchestratorError> {
        match &self.request {
            Some(Value::String(text)) if !text.is_empty() => Ok(text),
            _ => Err(OrchestratorError::InvalidInput(
                "Field 'request' must be a non-empty string.".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    pub task_id: TaskId,
}

fn parse_task_id(raw: &str) -> Result<TaskId, OrchestratorError> {
    raw.parse()
        .map_err(|_| OrchestratorError::NotFound(raw.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /tasks - Submit a request and start its pipeline.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<CreateTaskResponse>, OrchestratorError> {
    let text = req.request_text()?;
    let task_id = state.orchestrator.create_task(text).await?;
    Ok(Json(CreateTaskResponse { task_id }))
}

/// GET /tasks - List all tasks.
async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    Json(state.orchestrator.list_tasks().await)
}

/// GET /tasks/:id - Get a task snapshot.
async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, OrchestratorError> {
    let id = parse_task_id(&id)?;
    state.orchestrator.get_task(id).await.map(Json)
}

/// GET /tasks/:id/stream - Stream task snapshots via SSE.
async fn stream_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, OrchestratorError> {
    let id = parse_task_id(&id)?;
    let snapshots = state.orchestrator.subscribe_task(id).await?;
    tracing::debug!(task_id = %id, "Opened task stream");

    let events = snapshots.map(|task| Event::default().json_data(&task));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentSet, FixedReview};
    use crate::config::Config;
    use crate::orchestrator::{Orchestrator, PipelineConfig};
    use crate::task::{TaskStatus, TaskStore};
    use serde_json::json;

    fn state() -> Arc<AppState> {
        let orchestrator = Orchestrator::new(
            TaskStore::new(),
            AgentSet::standard(Arc::new(FixedReview::approve())),
            PipelineConfig::immediate(),
        );
        Arc::new(AppState {
            config: Config::default(),
            orchestrator: Arc::new(orchestrator),
        })
    }

    fn body(value: Value) -> CreateTaskRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_text_validation() {
        assert_eq!(
            body(json!({"request": "hello"})).request_text().unwrap(),
            "hello"
        );
        for bad in [
            json!({}),
            json!({"request": ""}),
            json!({"request": 42}),
            json!({"request": null}),
            json!({"request": ["a"]}),
        ] {
            assert!(matches!(
                body(bad).request_text(),
                Err(OrchestratorError::InvalidInput(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let state = state();
        let Json(created) = create_task(
            State(Arc::clone(&state)),
            Json(body(json!({"request": "Evaluate remote work policies"}))),
        )
        .await
        .unwrap();

        let Json(task) = get_task(State(Arc::clone(&state)), Path(created.task_id.to_string()))
            .await
            .unwrap();
        assert_eq!(task.id(), created.task_id);
        assert_eq!(task.request(), "Evaluate remote work policies");

        let Json(all) = list_tasks(State(state)).await;
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_payload_registers_nothing() {
        let state = state();
        let err = create_task(State(Arc::clone(&state)), Json(body(json!({"request": 7}))))
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput(_)));
        assert!(state.orchestrator.list_tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_id_is_not_found() {
        let state = state();
        for id in [TaskId::new().to_string(), "not-a-task".to_string()] {
            let err = get_task(State(Arc::clone(&state)), Path(id.clone()))
                .await
                .unwrap_err();
            assert_eq!(err, OrchestratorError::NotFound(id.clone()));

            assert!(stream_task(State(Arc::clone(&state)), Path(id))
                .await
                .is_err());
        }
    }

    #[tokio::test]
    async fn test_submitted_task_runs_in_background() {
        let state = state();
        let Json(created) = create_task(
            State(Arc::clone(&state)),
            Json(body(json!({"request": "hello"}))),
        )
        .await
        .unwrap();

        let mut stream = state
            .orchestrator
            .subscribe_task(created.task_id)
            .await
            .unwrap();
        let mut last = None;
        while let Some(task) = stream.next().await {
            last = Some(task);
        }
        assert_eq!(last.unwrap().status(), TaskStatus::Done);
    }
}
