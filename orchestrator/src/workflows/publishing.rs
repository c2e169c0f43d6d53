//! Publishing workflows: eligibility-gated submission and item deployment.

use chrono::Utc;
use tracing::{info, warn};

use catalog::hashing::compute_hash;
use catalog::publish::{publish_plan, PublishAction, PublishBlock, PublishPlan};
use catalog::snapshot::NotThirdPartyUrn;
use catalog::status::status_by_item_id;
use catalog::types::{CatalystEntity, CurationStatus, EntityContent, Item};

use crate::error::{ThirdPartyError, WorkflowError};
use crate::features::{ApplicationName, LINKED_WEARABLES_PAYMENTS};
use crate::workflow::{WorkflowEvent, WorkflowKind};

use super::Workflows;

impl Workflows {
    /// Submit a collection's eligible items for publishing and change pushes.
    ///
    /// The plan is derived from the current snapshot and enforced before
    /// anything leaves the process: a blocked or empty plan fails the run
    /// without touching the server. Confirmed items and freshly opened
    /// curations are merged back on success.
    pub async fn publish_and_push_changes(
        &self,
        collection_id: &str,
    ) -> Result<PublishPlan, WorkflowError> {
        let kind = WorkflowKind::PublishAndPushChanges;
        self.store.begin(kind).await;

        let snapshot = self.store.snapshot().await;
        let Some(collection) = snapshot.collections.get(collection_id) else {
            let error = WorkflowError::NotFound {
                kind: "collection",
                id: collection_id.to_string(),
            };
            return Err(self.fail(kind, error).await);
        };

        let items: Vec<Item> = snapshot
            .collection_items(collection_id)
            .into_iter()
            .cloned()
            .collect();
        let statuses = status_by_item_id(&snapshot);
        let curations = snapshot.collection_item_curations(collection_id);

        // Standard collections have no slot quota; only third-party
        // submissions consult the server for remaining slots.
        let slots = match snapshot.collection_third_party(collection) {
            Ok(Some(tp)) => match self.builder.fetch_slots(&tp.id).await {
                Ok(slots) => slots,
                Err(e) => return Err(self.fail(kind, e.into()).await),
            },
            Ok(None) => {
                let error = WorkflowError::NotFound {
                    kind: "third party",
                    id: collection.urn.clone().unwrap_or_default(),
                };
                return Err(self.fail(kind, error).await);
            }
            Err(NotThirdPartyUrn) => items.len() as u64,
        };

        let payments_enabled = self
            .flags
            .is_enabled(ApplicationName::Builder, LINKED_WEARABLES_PAYMENTS);

        let plan = publish_plan(&items, &statuses, curations, slots, payments_enabled);

        if let Some(block) = plan.block {
            let reason = match block {
                PublishBlock::UnderReview {
                    items_trying_to_publish,
                } => format!(
                    "A previous submission is under review; {} items are waiting",
                    items_trying_to_publish
                ),
                PublishBlock::NotEnoughSlots => "Not enough slots".to_string(),
            };
            return Err(self.fail(kind, WorkflowError::Blocked { reason }).await);
        }
        if plan.action == PublishAction::None {
            let error = WorkflowError::Blocked {
                reason: "Nothing to publish or push".to_string(),
            };
            return Err(self.fail(kind, error).await);
        }

        let mut item_ids = plan.to_publish.clone();
        item_ids.extend(plan.to_push_changes.iter().cloned());

        match self.builder.publish_items(collection_id, &item_ids).await {
            Ok(response) => {
                let collection_id = collection_id.to_string();
                let merged_items = response.items.clone();
                let merged_curations = response.item_curations.clone();
                let bucket = collection_id.clone();
                self.store
                    .finish_ok(kind, move |snapshot| {
                        for item in merged_items {
                            snapshot.items.insert(item.id.clone(), item);
                        }
                        snapshot
                            .item_curations
                            .entry(bucket)
                            .or_default()
                            .extend(merged_curations);
                    })
                    .await;

                info!(
                    collection_id,
                    published = plan.to_publish.len(),
                    pushed = plan.to_push_changes.len(),
                    "Publish submission confirmed"
                );
                self.emit(WorkflowEvent::PublishSucceeded {
                    collection_id,
                    items: response.items,
                    item_curations: response.item_curations,
                });
                Ok(plan)
            }
            Err(e) => Err(self.fail(kind, e.into()).await),
        }
    }

    /// Deploy items to the content network and settle their curations.
    ///
    /// Items are processed one by one; a failed item is recorded with the
    /// step that failed and does not stop the rest of the batch. Returns the
    /// number of items fully deployed, or the per-item failures when any
    /// occurred.
    pub async fn deploy_items(&self, item_ids: &[String]) -> Result<usize, Vec<ThirdPartyError>> {
        let kind = WorkflowKind::DeployItems;
        self.store.begin(kind).await;

        let snapshot = self.store.snapshot().await;
        let mut failures = Vec::new();
        let mut deployed = 0;

        for item_id in item_ids {
            let error = match snapshot.items.get(item_id) {
                Some(item) => match self.deploy_one(item).await {
                    Ok(entity) => {
                        self.store
                            .merge(move |snapshot| {
                                snapshot.entities.insert(entity.id.clone(), entity);
                            })
                            .await;
                        self.emit(WorkflowEvent::ItemDeployed {
                            item_id: item_id.clone(),
                        });
                        deployed += 1;
                        continue;
                    }
                    Err(e) => e,
                },
                None => ThirdPartyError::BuildEntity {
                    item_id: item_id.clone(),
                },
            };

            warn!(item_id, %error, "Item deployment failed");
            failures.push(error);
        }

        if failures.is_empty() {
            self.store.finish_ok(kind, |_| {}).await;
            info!(deployed, "Deployment batch complete");
            Ok(deployed)
        } else {
            let message = failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            self.store.finish_err(kind, message.clone()).await;
            self.emit(WorkflowEvent::WorkflowFailed { kind, message });
            Err(failures)
        }
    }

    /// Build, deploy and curate a single item.
    async fn deploy_one(&self, item: &Item) -> Result<CatalystEntity, ThirdPartyError> {
        let entity = self.build_entity(item).await?;

        let entity = self
            .catalyst
            .deploy_entity(entity)
            .await
            .map_err(|_| ThirdPartyError::Deployment {
                item_id: item.id.clone(),
            })?;

        self.builder
            .update_item_curation(&item.id, CurationStatus::Approved)
            .await
            .map_err(|_| ThirdPartyError::CurationUpdate {
                item_id: item.id.clone(),
            })?;

        Ok(entity)
    }

    /// Assemble the deployable entity for an item, verifying every content
    /// file is actually retrievable.
    async fn build_entity(&self, item: &Item) -> Result<CatalystEntity, ThirdPartyError> {
        let urn = item.urn.clone().ok_or_else(|| ThirdPartyError::BuildEntity {
            item_id: item.id.clone(),
        })?;

        let mut content: Vec<EntityContent> = Vec::with_capacity(item.contents.len());
        for (key, hash) in &item.contents {
            self.catalyst
                .fetch_content(hash)
                .await
                .map_err(|_| ThirdPartyError::BuildEntity {
                    item_id: item.id.clone(),
                })?;
            content.push(EntityContent {
                key: key.clone(),
                hash: hash.clone(),
            });
        }
        content.sort_by(|a, b| a.key.cmp(&b.key));

        // Entity id is the hash of the sorted content listing
        let listing: String = content
            .iter()
            .map(|c| format!("{}:{}\n", c.key, c.hash))
            .collect();
        let id = compute_hash(listing.as_bytes());

        Ok(CatalystEntity {
            id,
            pointers: vec![urn],
            content,
            timestamp: Utc::now().timestamp_millis(),
        })
    }
}
