//! The catalog store.
//!
//! Single mutation path for derived state: workflows mark themselves loading,
//! then commit a merge closure on success or record an error on failure.
//! Readers take immutable [`StateSnapshot`] clones and never observe a
//! half-applied merge.
//!
//! Loading markers are counted per workflow kind, so overlapping runs of the
//! same kind stay marked until the last one settles.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use catalog::snapshot::StateSnapshot;

use crate::workflow::WorkflowKind;

#[derive(Default)]
struct StoreInner {
    snapshot: StateSnapshot,
    loading: HashMap<WorkflowKind, usize>,
    last_errors: HashMap<WorkflowKind, String>,
}

/// Shared state container for the orchestrator.
#[derive(Default)]
pub struct CatalogStore {
    inner: RwLock<StoreInner>,
}

impl CatalogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a snapshot.
    pub fn with_snapshot(snapshot: StateSnapshot) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                snapshot,
                loading: HashMap::new(),
                last_errors: HashMap::new(),
            }),
        }
    }

    /// Take an immutable clone of the current state.
    pub async fn snapshot(&self) -> StateSnapshot {
        self.inner.read().await.snapshot.clone()
    }

    /// Whether any run of `kind` is in flight.
    pub async fn is_loading(&self, kind: WorkflowKind) -> bool {
        self.inner
            .read()
            .await
            .loading
            .get(&kind)
            .is_some_and(|count| *count > 0)
    }

    /// The error recorded by the last failed run of `kind`, if any.
    pub async fn last_error(&self, kind: WorkflowKind) -> Option<String> {
        self.inner.read().await.last_errors.get(&kind).cloned()
    }

    /// Mark a run of `kind` as started and clear its previous error.
    pub(crate) async fn begin(&self, kind: WorkflowKind) {
        let mut inner = self.inner.write().await;
        *inner.loading.entry(kind).or_insert(0) += 1;
        inner.last_errors.remove(&kind);
        debug!(?kind, "Workflow started");
    }

    /// Commit a successful run: apply the merge and drop one loading mark.
    pub(crate) async fn finish_ok<F>(&self, kind: WorkflowKind, merge: F)
    where
        F: FnOnce(&mut StateSnapshot),
    {
        let mut inner = self.inner.write().await;
        merge(&mut inner.snapshot);
        decrement(&mut inner.loading, kind);
        debug!(?kind, "Workflow succeeded");
    }

    /// Record a failed run: keep the snapshot, store the error.
    pub(crate) async fn finish_err(&self, kind: WorkflowKind, message: String) {
        let mut inner = self.inner.write().await;
        decrement(&mut inner.loading, kind);
        inner.last_errors.insert(kind, message);
        debug!(?kind, "Workflow failed");
    }

    /// Apply a merge outside the begin/finish lifecycle.
    ///
    /// Used for incremental chunk confirmations while the owning workflow
    /// stays marked as loading.
    pub(crate) async fn merge<F>(&self, merge: F)
    where
        F: FnOnce(&mut StateSnapshot),
    {
        let mut inner = self.inner.write().await;
        merge(&mut inner.snapshot);
    }
}

fn decrement(loading: &mut HashMap<WorkflowKind, usize>, kind: WorkflowKind) {
    if let Some(count) = loading.get_mut(&kind) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            loading.remove(&kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loading_lifecycle() {
        let store = CatalogStore::new();
        let kind = WorkflowKind::FetchCollections;

        assert!(!store.is_loading(kind).await);

        store.begin(kind).await;
        assert!(store.is_loading(kind).await);

        store.finish_ok(kind, |_| {}).await;
        assert!(!store.is_loading(kind).await);
    }

    #[tokio::test]
    async fn test_overlapping_runs_stay_loading_until_last_settles() {
        let store = CatalogStore::new();
        let kind = WorkflowKind::SetThirdPartyKind;

        store.begin(kind).await;
        store.begin(kind).await;

        store.finish_ok(kind, |_| {}).await;
        assert!(store.is_loading(kind).await);

        store.finish_ok(kind, |_| {}).await;
        assert!(!store.is_loading(kind).await);
    }

    #[tokio::test]
    async fn test_failure_records_error_and_new_run_clears_it() {
        let store = CatalogStore::new();
        let kind = WorkflowKind::PublishAndPushChanges;

        store.begin(kind).await;
        store.finish_err(kind, "server said no".to_string()).await;

        assert!(!store.is_loading(kind).await);
        assert_eq!(store.last_error(kind).await.as_deref(), Some("server said no"));

        store.begin(kind).await;
        assert_eq!(store.last_error(kind).await, None);
    }

    #[tokio::test]
    async fn test_failure_keeps_snapshot() {
        let mut snapshot = StateSnapshot::default();
        snapshot.address = Some("0xabc".to_string());
        let store = CatalogStore::with_snapshot(snapshot);

        let kind = WorkflowKind::FetchEntities;
        store.begin(kind).await;
        store.finish_err(kind, "timeout".to_string()).await;

        assert_eq!(store.snapshot().await.address.as_deref(), Some("0xabc"));
    }
}
