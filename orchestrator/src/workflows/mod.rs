//! Workflow implementations.
//!
//! Each workflow follows the same lifecycle against the store: mark loading,
//! call the backends, merge confirmed results on success or record the error
//! on failure. Progress and failure notifications go out on the event
//! channel; callers that need the outcome also get it as a `Result`.

mod fetch;
mod publishing;
mod rescue;

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::backend::{BuilderBackend, CatalystBackend};
use crate::config::OrchestratorConfig;
use crate::error::WorkflowError;
use crate::features::FeatureFlags;
use crate::store::CatalogStore;
use crate::workflow::{WorkflowEvent, WorkflowKind};

/// The workflow engine.
///
/// Owns the backends and the store; every method is a complete workflow run
/// that executes on the caller's task. A run started directly is never
/// aborted — when overlapping runs of the same kind must supersede each
/// other, spawn them through a [`WorkflowRunner`](crate::workflow::WorkflowRunner)
/// keyed by the run's [`WorkflowKind`].
pub struct Workflows {
    pub(crate) config: OrchestratorConfig,
    pub(crate) store: Arc<CatalogStore>,
    pub(crate) builder: Arc<dyn BuilderBackend>,
    pub(crate) catalyst: Arc<dyn CatalystBackend>,
    pub(crate) flags: Arc<dyn FeatureFlags>,
    events: mpsc::UnboundedSender<WorkflowEvent>,
}

impl Workflows {
    /// Create a workflow engine and the receiving end of its event channel.
    pub fn new(
        config: OrchestratorConfig,
        store: Arc<CatalogStore>,
        builder: Arc<dyn BuilderBackend>,
        catalyst: Arc<dyn CatalystBackend>,
        flags: Arc<dyn FeatureFlags>,
    ) -> (Self, mpsc::UnboundedReceiver<WorkflowEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                config,
                store,
                builder,
                catalyst,
                flags,
                events,
            },
            receiver,
        )
    }

    /// The store this engine writes to.
    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Emit a progress event; observers may have hung up, which is fine.
    pub(crate) fn emit(&self, event: WorkflowEvent) {
        let _ = self.events.send(event);
    }

    /// Record a failed run and notify observers.
    pub(crate) async fn fail(&self, kind: WorkflowKind, error: WorkflowError) -> WorkflowError {
        self.store.finish_err(kind, error.to_string()).await;
        self.emit(WorkflowEvent::WorkflowFailed {
            kind,
            message: error.to_string(),
        });
        error
    }

    /// Switch a third party between programmatic and regular slot usage.
    pub async fn set_third_party_kind(
        &self,
        third_party_id: &str,
        is_programmatic: bool,
    ) -> Result<(), WorkflowError> {
        let kind = WorkflowKind::SetThirdPartyKind;
        self.store.begin(kind).await;

        match self
            .builder
            .set_third_party_kind(third_party_id, is_programmatic)
            .await
        {
            Ok(()) => {
                let id = third_party_id.to_string();
                self.store
                    .finish_ok(kind, move |snapshot| {
                        if let Some(tp) = snapshot.third_parties.get_mut(&id) {
                            tp.is_programmatic = is_programmatic;
                        }
                    })
                    .await;
                info!(third_party_id, is_programmatic, "Third party kind updated");
                Ok(())
            }
            Err(e) => Err(self.fail(kind, e.into()).await),
        }
    }
}
