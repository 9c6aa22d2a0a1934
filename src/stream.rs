//! Observer side of the update channel.
//!
//! Two interchangeable feeds produce the same observable sequence: the current
//! snapshot first, then further snapshots until the task is terminal (the
//! terminal snapshot is always delivered) or disappears.
//!
//! - `Push` drains the store's per-task change feed, one snapshot per commit.
//! - `Poll` re-reads the store on a fixed interval. Consecutive snapshots may
//!   repeat and short-lived states between ticks may be missed.

use std::pin::Pin;
use std::time::Duration;

use futures::stream::Stream;
use tokio::sync::mpsc;

use crate::task::{Task, TaskId, TaskStore};

pub type TaskStream = Pin<Box<dyn Stream<Item = Task> + Send>>;

/// Default interval for the polling feed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Push,
    Poll { interval: Duration },
}

impl Default for StreamMode {
    fn default() -> Self {
        Self::Push
    }
}

/// Turn a store subscription into a stream of snapshots.
pub fn push_stream(mut rx: mpsc::UnboundedReceiver<Task>) -> TaskStream {
    Box::pin(async_stream::stream! {
        while let Some(task) = rx.recv().await {
            let terminal = task.is_terminal();
            yield task;
            if terminal {
                break;
            }
        }
    })
}

/// Poll the store for `id` every `interval`.
pub fn poll_stream(store: TaskStore, id: TaskId, interval: Duration) -> TaskStream {
    Box::pin(async_stream::stream! {
        loop {
            let Some(task) = store.get(id).await else {
                tracing::debug!(task_id = %id, "Task disappeared, closing poll stream");
                break;
            };
            let terminal = task.is_terminal();
            yield task;
            if terminal {
                break;
            }
            tokio::time::sleep(interval).await;
        }
    })
}
