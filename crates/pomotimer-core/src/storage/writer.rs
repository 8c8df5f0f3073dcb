//! Fire-and-forget persistence writes.
//!
//! The engine never waits on storage. Writes are queued to a background
//! task that applies them in order on the blocking pool; failures are logged
//! and dropped, leaving the in-memory state authoritative.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use super::PersistenceStore;

#[derive(Debug)]
enum Write {
    CompletedCount(u32),
    LastTask(String),
    ClearCompleted,
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Clone)]
pub struct PersistenceWriter {
    tx: mpsc::UnboundedSender<Write>,
}

impl PersistenceWriter {
    /// Spawn the writer task on `runtime`. It runs until every writer
    /// handle is dropped.
    pub fn spawn(runtime: &Handle, store: Arc<dyn PersistenceStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Write>();
        runtime.spawn(async move {
            while let Some(write) = rx.recv().await {
                if let Write::Flush(done) = write {
                    let _ = done.send(());
                    continue;
                }
                let store = Arc::clone(&store);
                let applied = tokio::task::spawn_blocking(move || apply(store.as_ref(), write)).await;
                if let Err(e) = applied {
                    tracing::warn!(error = %e, "persistence write task failed");
                }
            }
            tracing::debug!("persistence writer finished");
        });
        Self { tx }
    }

    pub fn set_completed_count(&self, count: u32) {
        self.enqueue(Write::CompletedCount(count));
    }

    pub fn set_last_task(&self, task: impl Into<String>) {
        self.enqueue(Write::LastTask(task.into()));
    }

    pub fn clear_completed(&self) {
        self.enqueue(Write::ClearCompleted);
    }

    /// Wait until every write queued before this call has been applied.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.enqueue(Write::Flush(done));
        let _ = wait.await;
    }

    fn enqueue(&self, write: Write) {
        if self.tx.send(write).is_err() {
            tracing::warn!("persistence writer is gone, dropping write");
        }
    }
}

fn apply(store: &dyn PersistenceStore, write: Write) {
    let (what, result) = match write {
        Write::CompletedCount(n) => ("completed count", store.set_completed_count(n)),
        Write::LastTask(task) => ("last task", store.set_last_task(&task)),
        Write::ClearCompleted => ("clear completed", store.clear_completed()),
        Write::Flush(_) => return,
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to persist {what}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::storage::{AlarmSoundConfig, MemoryStore};

    #[tokio::test]
    async fn writes_apply_in_order() {
        let store = Arc::new(MemoryStore::new());
        let writer = PersistenceWriter::spawn(&Handle::current(), store.clone());

        writer.set_completed_count(1);
        writer.set_completed_count(2);
        writer.set_last_task("first");
        writer.set_last_task("second");
        writer.flush().await;

        assert_eq!(store.completed_count().unwrap(), 2);
        assert_eq!(store.last_task().unwrap(), "second");

        writer.clear_completed();
        writer.flush().await;
        assert_eq!(store.completed_count().unwrap(), 0);
    }

    struct FailingStore;

    impl PersistenceStore for FailingStore {
        fn completed_count(&self) -> Result<u32, StoreError> {
            Err(StoreError::Unavailable)
        }
        fn set_completed_count(&self, _: u32) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
        fn last_task(&self) -> Result<String, StoreError> {
            Err(StoreError::Unavailable)
        }
        fn set_last_task(&self, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
        fn alarm_sound(&self) -> Result<AlarmSoundConfig, StoreError> {
            Err(StoreError::Unavailable)
        }
        fn set_alarm_sound(&self, _: &AlarmSoundConfig) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_writer() {
        let writer = PersistenceWriter::spawn(&Handle::current(), Arc::new(FailingStore));
        writer.set_completed_count(3);
        writer.set_last_task("x");
        writer.flush().await;
        writer.flush().await;
    }
}
