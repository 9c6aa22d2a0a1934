//! HTTP server setup.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::agents::AgentSet;
use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::task::TaskStore;

use super::tasks;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Pipeline driver; owns the task store
    pub orchestrator: Arc<Orchestrator>,
}

/// Build the router over an existing state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/tasks", tasks::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let agents = AgentSet::standard(config.review.build_policy());
    let orchestrator = Orchestrator::new(TaskStore::new(), agents, config.pipeline.clone())
        .with_stream_mode(config.stream_mode);

    let state = Arc::new(AppState {
        config: config.clone(),
        orchestrator: Arc::new(orchestrator),
    });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        step_delay_ms = config.pipeline.step_delay.as_millis() as u64,
        stream_mode = ?config.stream_mode,
        revision_probability = config.review.revision_probability,
        "Server listening on {}",
        addr
    );

    // Setup graceful shutdown on SIGTERM/SIGINT
    let shutdown_state = Arc::clone(&state);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            shutdown_signal(shutdown_state).await;
        })
        .await?;

    Ok(())
}

/// Wait for a shutdown signal, then stop every running pipeline.
async fn shutdown_signal(state: Arc<AppState>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    let running = state
        .orchestrator
        .list_tasks()
        .await
        .iter()
        .filter(|t| !t.is_terminal())
        .count();
    tracing::info!(
        "Shutdown signal received, cancelling {} running pipelines",
        running
    );
    state.orchestrator.shutdown();
}

/// Liveness endpoint.
async fn root(State(_state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "Multi-Agent Orchestrator API",
        "status": "running"
    }))
}
