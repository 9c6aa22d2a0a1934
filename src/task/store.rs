//! In-memory task store with per-task change notification.
//!
//! The store is the only shared mutable state in the process. Writers replace
//! the whole `Task` value on every commit, so readers only ever observe
//! complete snapshots. Each commit is fanned out to the task's subscribers
//! while the write lock is held, which keeps delivery in commit order.
//!
//! Nothing is persisted: a restart loses every task.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

use super::task::{Task, TaskId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Task {0} is not in the store")]
    UnknownTask(TaskId),

    #[error("Task {0} is terminal and can no longer be updated")]
    Terminal(TaskId),
}

#[derive(Debug)]
struct Entry {
    task: Task,
    subscribers: Vec<mpsc::UnboundedSender<Task>>,
}

/// Shared handle to the task map. Cloning is cheap and yields the same store.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    entries: Arc<RwLock<HashMap<TaskId, Entry>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new `Pending` task and return a snapshot of it.
    pub async fn create(&self, request: impl Into<String>) -> Task {
        let task = Task::new(request);
        let mut entries = self.entries.write().await;
        entries.insert(
            task.id(),
            Entry {
                task: task.clone(),
                subscribers: Vec::new(),
            },
        );
        task
    }

    pub async fn get(&self, id: TaskId) -> Option<Task> {
        let entries = self.entries.read().await;
        entries.get(&id).map(|e| e.task.clone())
    }

    /// Snapshots of every task, in map iteration order.
    pub async fn list(&self) -> Vec<Task> {
        let entries = self.entries.read().await;
        entries.values().map(|e| e.task.clone()).collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Replace the stored task with `task` and notify subscribers.
    ///
    /// Once a terminal snapshot has been committed the entry is frozen and
    /// every subscription is closed after receiving that snapshot.
    pub async fn commit(&self, task: Task) -> Result<(), StoreError> {
        let id = task.id();
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&id).ok_or(StoreError::UnknownTask(id))?;

        if entry.task.is_terminal() {
            return Err(StoreError::Terminal(id));
        }

        entry
            .subscribers
            .retain(|tx| tx.send(task.clone()).is_ok());
        if task.is_terminal() {
            entry.subscribers.clear();
        }
        entry.task = task;
        Ok(())
    }

    /// Open a change feed for `id`.
    ///
    /// The receiver yields the current snapshot immediately, then one
    /// snapshot per commit. It closes after the terminal snapshot. Returns
    /// `None` for unknown tasks.
    pub async fn subscribe(&self, id: TaskId) -> Option<mpsc::UnboundedReceiver<Task>> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&id)?;

        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive, send cannot fail here.
        let _ = tx.send(entry.task.clone());
        if !entry.task.is_terminal() {
            entry.subscribers.push(tx);
        }
        Some(rx)
    }

    /// Number of live subscriptions for `id`.
    pub async fn subscriber_count(&self, id: TaskId) -> usize {
        let entries = self.entries.read().await;
        entries.get(&id).map(|e| e.subscribers.len()).unwrap_or(0)
    }
}
