//! Chunked rescue workflow.
//!
//! A rescue redeploys already-approved items at given content hashes. Large
//! batches are split into fixed-size chunks submitted sequentially; each
//! confirmed chunk is merged and announced before the next one goes out, and
//! a failed chunk fails the whole run without retrying.

use tracing::{info, warn};

use crate::error::WorkflowError;
use crate::workflow::{WorkflowEvent, WorkflowKind};

use super::Workflows;

impl Workflows {
    /// Rescue items in chunks, reporting per-chunk progress.
    ///
    /// `item_ids` and `content_hashes` are parallel slices.
    pub async fn rescue_items(
        &self,
        collection_id: &str,
        item_ids: &[String],
        content_hashes: &[String],
    ) -> Result<usize, WorkflowError> {
        let kind = WorkflowKind::RescueItems;
        self.store.begin(kind).await;

        if item_ids.len() != content_hashes.len() {
            let error = WorkflowError::Blocked {
                reason: format!(
                    "Rescue batch mismatch: {} items, {} hashes",
                    item_ids.len(),
                    content_hashes.len()
                ),
            };
            return Err(self.fail(kind, error).await);
        }

        let chunk_size = self.config.rescue_chunk_size.max(1);
        let total_chunks = item_ids.len().div_ceil(chunk_size);
        let mut rescued = 0;

        for (chunk_index, (ids, hashes)) in item_ids
            .chunks(chunk_size)
            .zip(content_hashes.chunks(chunk_size))
            .enumerate()
        {
            match self.builder.rescue_items(collection_id, ids, hashes).await {
                Ok(items) => {
                    rescued += items.len();
                    let merged = items.clone();
                    self.store
                        .merge(move |snapshot| {
                            for item in merged {
                                snapshot.items.insert(item.id.clone(), item);
                            }
                        })
                        .await;
                    self.emit(WorkflowEvent::RescueChunkSucceeded {
                        collection_id: collection_id.to_string(),
                        chunk_index,
                        total_chunks,
                        items,
                    });
                }
                Err(e) => {
                    warn!(
                        collection_id,
                        chunk_index, total_chunks, "Rescue chunk failed"
                    );
                    return Err(self.fail(kind, e.into()).await);
                }
            }
        }

        self.store.finish_ok(kind, |_| {}).await;
        self.emit(WorkflowEvent::RescueSucceeded {
            collection_id: collection_id.to_string(),
            total_items: rescued,
        });
        info!(collection_id, rescued, total_chunks, "Rescue complete");
        Ok(rescued)
    }
}
