//! Fetch workflows: hydrate the snapshot from the backends.

use tracing::info;

use crate::backend::{BackendError, Paginated};
use crate::error::WorkflowError;
use crate::workflow::WorkflowKind;

use super::Workflows;

impl Workflows {
    /// Fetch every collection visible to an address and merge them in.
    pub async fn fetch_collections(&self, address: &str) -> Result<usize, WorkflowError> {
        let kind = WorkflowKind::FetchCollections;
        self.store.begin(kind).await;

        let result = self
            .fetch_all_pages(|page, limit| self.builder.fetch_collections(address, page, limit))
            .await;

        match result {
            Ok(collections) => {
                let count = collections.len();
                let address = address.to_string();
                self.store
                    .finish_ok(kind, move |snapshot| {
                        snapshot.address = Some(address);
                        for collection in collections {
                            snapshot.collections.insert(collection.id.clone(), collection);
                        }
                    })
                    .await;
                info!(count, "Collections fetched");
                Ok(count)
            }
            Err(e) => Err(self.fail(kind, e.into()).await),
        }
    }

    /// Fetch every item of a collection and merge them in.
    pub async fn fetch_collection_items(
        &self,
        collection_id: &str,
    ) -> Result<usize, WorkflowError> {
        let kind = WorkflowKind::FetchCollectionItems;
        self.store.begin(kind).await;

        let result = self
            .fetch_all_pages(|page, limit| {
                self.builder.fetch_collection_items(collection_id, page, limit)
            })
            .await;

        match result {
            Ok(items) => {
                let count = items.len();
                self.store
                    .finish_ok(kind, move |snapshot| {
                        for item in items {
                            snapshot.items.insert(item.id.clone(), item);
                        }
                    })
                    .await;
                info!(collection_id, count, "Collection items fetched");
                Ok(count)
            }
            Err(e) => Err(self.fail(kind, e.into()).await),
        }
    }

    /// Fetch the curations of a collection's items, replacing the stored set.
    pub async fn fetch_item_curations(&self, collection_id: &str) -> Result<usize, WorkflowError> {
        let kind = WorkflowKind::FetchItemCurations;
        self.store.begin(kind).await;

        match self.builder.fetch_item_curations(collection_id).await {
            Ok(curations) => {
                let count = curations.len();
                let collection_id = collection_id.to_string();
                self.store
                    .finish_ok(kind, move |snapshot| {
                        snapshot.item_curations.insert(collection_id, curations);
                    })
                    .await;
                Ok(count)
            }
            Err(e) => Err(self.fail(kind, e.into()).await),
        }
    }

    /// Fetch the third parties an address manages and merge them in.
    pub async fn fetch_third_parties(&self, address: &str) -> Result<usize, WorkflowError> {
        let kind = WorkflowKind::FetchThirdParties;
        self.store.begin(kind).await;

        match self.builder.fetch_third_parties(address).await {
            Ok(third_parties) => {
                let count = third_parties.len();
                self.store
                    .finish_ok(kind, move |snapshot| {
                        for tp in third_parties {
                            snapshot.third_parties.insert(tp.id.clone(), tp);
                        }
                    })
                    .await;
                info!(count, "Third parties fetched");
                Ok(count)
            }
            Err(e) => Err(self.fail(kind, e.into()).await),
        }
    }

    /// Refresh the deployed entities behind a collection's item pointers.
    ///
    /// Entities previously stored for those pointers are dropped first, so a
    /// pointer whose deployment disappeared reads as missing afterwards.
    pub async fn refresh_collection_entities(
        &self,
        collection_id: &str,
    ) -> Result<usize, WorkflowError> {
        let kind = WorkflowKind::FetchEntities;
        self.store.begin(kind).await;

        let snapshot = self.store.snapshot().await;
        let pointers: Vec<String> = snapshot
            .collection_items(collection_id)
            .iter()
            .filter_map(|item| item.urn.clone())
            .collect();

        if pointers.is_empty() {
            self.store.finish_ok(kind, |_| {}).await;
            return Ok(0);
        }

        match self.catalyst.fetch_entities_by_pointers(&pointers).await {
            Ok(entities) => {
                let count = entities.len();
                self.store
                    .finish_ok(kind, move |snapshot| {
                        snapshot.entities.retain(|_, entity| {
                            !entity.pointers.iter().any(|p| pointers.contains(p))
                        });
                        for entity in entities {
                            snapshot.entities.insert(entity.id.clone(), entity);
                        }
                    })
                    .await;
                info!(collection_id, count, "Entities refreshed");
                Ok(count)
            }
            Err(e) => Err(self.fail(kind, e.into()).await),
        }
    }

    /// Drain a paginated endpoint page by page.
    async fn fetch_all_pages<T, F, Fut>(&self, mut fetch: F) -> Result<Vec<T>, BackendError>
    where
        F: FnMut(u64, u64) -> Fut,
        Fut: std::future::Future<Output = Result<Paginated<T>, BackendError>>,
    {
        let limit = self.config.page_size;
        let mut page = 1;
        let mut all = Vec::new();

        loop {
            let batch = fetch(page, limit).await?;
            let has_more = batch.has_more();
            all.extend(batch.results);
            if !has_more {
                return Ok(all);
            }
            page += 1;
        }
    }
}
