//! Workflow identities, progress events and the latest-wins runner.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::task::JoinHandle;

use catalog::types::{Item, ItemCuration};

/// Identity of a workflow, used for loading markers and supersession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    FetchCollections,
    FetchCollectionItems,
    FetchItemCurations,
    FetchThirdParties,
    FetchEntities,
    PublishAndPushChanges,
    RescueItems,
    DeployItems,
    SetThirdPartyKind,
}

/// Progress notifications emitted while workflows run.
///
/// Chunked workflows report each confirmed chunk before the aggregate
/// completion so observers can show incremental progress.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// One rescue transaction confirmed
    RescueChunkSucceeded {
        collection_id: String,
        chunk_index: usize,
        total_chunks: usize,
        items: Vec<Item>,
    },
    /// Every rescue chunk confirmed
    RescueSucceeded {
        collection_id: String,
        total_items: usize,
    },
    /// A publish submission was confirmed by the server
    PublishSucceeded {
        collection_id: String,
        items: Vec<Item>,
        item_curations: Vec<ItemCuration>,
    },
    /// One item finished its deploy-and-curate round
    ItemDeployed { item_id: String },
    /// A workflow run failed and recorded its error
    WorkflowFailed {
        kind: WorkflowKind,
        message: String,
    },
}

/// Latest-wins task runner.
///
/// At most one task per workflow kind is in flight; spawning a new one
/// aborts the previous run so a stale response can never overwrite a newer
/// one.
pub struct WorkflowRunner {
    handles: Mutex<HashMap<WorkflowKind, JoinHandle<()>>>,
}

impl WorkflowRunner {
    /// Create a runner with nothing in flight.
    pub fn new() -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Spawn a task for `kind`, aborting any previous run of the same kind.
    pub fn supersede<F>(&self, kind: WorkflowKind, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let previous = self.handles.lock().unwrap().insert(kind, handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Wait for the in-flight run of `kind`, if any.
    ///
    /// An aborted run resolves without error; only the surviving run's
    /// effects reach the store.
    pub async fn wait(&self, kind: WorkflowKind) {
        let handle = self.handles.lock().unwrap().remove(&kind);
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Abort every in-flight run.
    pub fn abort_all(&self) {
        for (_, handle) in self.handles.lock().unwrap().drain() {
            handle.abort();
        }
    }
}

impl Default for WorkflowRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkflowRunner {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_latest_run_supersedes_previous() {
        let runner = WorkflowRunner::new();
        let completions = Arc::new(AtomicU32::new(0));

        let slow = completions.clone();
        runner.supersede(WorkflowKind::FetchCollections, async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            slow.fetch_add(1, Ordering::SeqCst);
        });

        let fast = completions.clone();
        runner.supersede(WorkflowKind::FetchCollections, async move {
            fast.fetch_add(1, Ordering::SeqCst);
        });

        runner.wait(WorkflowKind::FetchCollections).await;
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_kinds_run_independently() {
        let runner = WorkflowRunner::new();
        let completions = Arc::new(AtomicU32::new(0));

        for kind in [WorkflowKind::FetchCollections, WorkflowKind::RescueItems] {
            let counter = completions.clone();
            runner.supersede(kind, async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        runner.wait(WorkflowKind::FetchCollections).await;
        runner.wait(WorkflowKind::RescueItems).await;
        assert_eq!(completions.load(Ordering::SeqCst), 2);
    }
}
