//! In-memory backends for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use catalog::types::{
    CatalystEntity, Collection, CurationStatus, Item, ItemCuration, ThirdParty,
};

use super::traits::*;

/// Mock catalog server for testing.
///
/// Seeded with records through the builder methods; mutations behave like
/// the real server (publishing flips flags, pushes open curations).
pub struct MockBuilderBackend {
    available: AtomicBool,
    collections: Mutex<Vec<Collection>>,
    items: Mutex<Vec<Item>>,
    curations: Mutex<Vec<ItemCuration>>,
    third_parties: Mutex<Vec<ThirdParty>>,
    slots: Mutex<HashMap<String, u64>>,
    fail_publish: AtomicBool,
    fail_curation_update: AtomicBool,
    publish_calls: AtomicU32,
    rescue_calls: AtomicU32,
    curation_update_calls: AtomicU32,
}

impl MockBuilderBackend {
    /// Create an empty mock server.
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            collections: Mutex::new(Vec::new()),
            items: Mutex::new(Vec::new()),
            curations: Mutex::new(Vec::new()),
            third_parties: Mutex::new(Vec::new()),
            slots: Mutex::new(HashMap::new()),
            fail_publish: AtomicBool::new(false),
            fail_curation_update: AtomicBool::new(false),
            publish_calls: AtomicU32::new(0),
            rescue_calls: AtomicU32::new(0),
            curation_update_calls: AtomicU32::new(0),
        }
    }

    /// Seed collections.
    pub fn with_collections(self, collections: Vec<Collection>) -> Self {
        *self.collections.lock().unwrap() = collections;
        self
    }

    /// Seed items.
    pub fn with_items(self, items: Vec<Item>) -> Self {
        *self.items.lock().unwrap() = items;
        self
    }

    /// Seed item curations.
    pub fn with_curations(self, curations: Vec<ItemCuration>) -> Self {
        *self.curations.lock().unwrap() = curations;
        self
    }

    /// Seed third parties.
    pub fn with_third_parties(self, third_parties: Vec<ThirdParty>) -> Self {
        *self.third_parties.lock().unwrap() = third_parties;
        self
    }

    /// Seed the slot allowance of a third party.
    pub fn with_slots(self, third_party_id: impl Into<String>, slots: u64) -> Self {
        self.slots.lock().unwrap().insert(third_party_id.into(), slots);
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Make publish submissions fail.
    pub fn with_failing_publish(self) -> Self {
        self.fail_publish.store(true, Ordering::SeqCst);
        self
    }

    /// Make curation updates fail.
    pub fn with_failing_curation_update(self) -> Self {
        self.fail_curation_update.store(true, Ordering::SeqCst);
        self
    }

    /// Number of publish submissions received.
    pub fn publish_calls(&self) -> u32 {
        self.publish_calls.load(Ordering::SeqCst)
    }

    /// Number of rescue batches received.
    pub fn rescue_calls(&self) -> u32 {
        self.rescue_calls.load(Ordering::SeqCst)
    }

    /// Number of curation updates received.
    pub fn curation_update_calls(&self) -> u32 {
        self.curation_update_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Unavailable("Mock backend disabled".to_string()))
        }
    }

    fn paginate<T: Clone>(records: Vec<T>, page: u64, limit: u64) -> Paginated<T> {
        let total = records.len() as u64;
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        let start = ((page.saturating_sub(1)) * limit) as usize;
        let results = records
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        Paginated {
            results,
            total,
            pages,
            page,
            limit,
        }
    }
}

impl Default for MockBuilderBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuilderBackend for MockBuilderBackend {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn fetch_collections(
        &self,
        address: &str,
        page: u64,
        limit: u64,
    ) -> Result<Paginated<Collection>, BackendError> {
        self.check_available()?;
        let matching: Vec<Collection> = self
            .collections
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.owner.eq_ignore_ascii_case(address))
            .cloned()
            .collect();
        Ok(Self::paginate(matching, page, limit))
    }

    async fn fetch_collection_items(
        &self,
        collection_id: &str,
        page: u64,
        limit: u64,
    ) -> Result<Paginated<Item>, BackendError> {
        self.check_available()?;
        let matching: Vec<Item> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.collection_id.as_deref() == Some(collection_id))
            .cloned()
            .collect();
        Ok(Self::paginate(matching, page, limit))
    }

    async fn fetch_item_curations(
        &self,
        collection_id: &str,
    ) -> Result<Vec<ItemCuration>, BackendError> {
        self.check_available()?;
        let item_ids: Vec<String> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.collection_id.as_deref() == Some(collection_id))
            .map(|i| i.id.clone())
            .collect();
        Ok(self
            .curations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| item_ids.contains(&c.item_id))
            .cloned()
            .collect())
    }

    async fn update_item_curation(
        &self,
        item_id: &str,
        status: CurationStatus,
    ) -> Result<ItemCuration, BackendError> {
        self.curation_update_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if self.fail_curation_update.load(Ordering::SeqCst) {
            return Err(BackendError::RequestFailed(format!(
                "Curation update rejected for {}",
                item_id
            )));
        }

        let mut curations = self.curations.lock().unwrap();
        let latest = curations
            .iter_mut()
            .filter(|c| c.item_id == item_id)
            .max_by_key(|c| c.created_at)
            .ok_or_else(|| {
                BackendError::RequestFailed(format!("No curation for item {}", item_id))
            })?;

        latest.status = status;
        latest.updated_at = Utc::now();
        Ok(latest.clone())
    }

    async fn publish_items(
        &self,
        collection_id: &str,
        item_ids: &[String],
    ) -> Result<PublishResponse, BackendError> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(BackendError::RequestFailed(format!(
                "Publish rejected for collection {}",
                collection_id
            )));
        }

        let now = Utc::now();
        let mut items = self.items.lock().unwrap();
        let mut curations = self.curations.lock().unwrap();
        let mut confirmed = Vec::new();
        let mut opened = Vec::new();

        for id in item_ids {
            let Some(item) = items.iter_mut().find(|i| &i.id == id) else {
                return Err(BackendError::RequestFailed(format!("Unknown item {}", id)));
            };

            if item.is_published {
                // Already on-chain; a push opens a fresh review
                let curation = ItemCuration {
                    id: uuid::Uuid::new_v4().to_string(),
                    item_id: id.clone(),
                    status: CurationStatus::Pending,
                    content_hash: None,
                    created_at: now,
                    updated_at: now,
                };
                curations.push(curation.clone());
                opened.push(curation);
            } else {
                item.is_published = true;
            }
            confirmed.push(item.clone());
        }

        Ok(PublishResponse {
            items: confirmed,
            item_curations: opened,
        })
    }

    async fn rescue_items(
        &self,
        collection_id: &str,
        item_ids: &[String],
        content_hashes: &[String],
    ) -> Result<Vec<Item>, BackendError> {
        self.rescue_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if item_ids.len() != content_hashes.len() {
            return Err(BackendError::RequestFailed(format!(
                "Mismatched rescue batch for collection {}",
                collection_id
            )));
        }

        let items = self.items.lock().unwrap();
        Ok(items
            .iter()
            .filter(|i| item_ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn fetch_third_parties(&self, address: &str) -> Result<Vec<ThirdParty>, BackendError> {
        self.check_available()?;
        Ok(self
            .third_parties
            .lock()
            .unwrap()
            .iter()
            .filter(|tp| tp.managers.iter().any(|m| m.eq_ignore_ascii_case(address)))
            .cloned()
            .collect())
    }

    async fn fetch_slots(&self, third_party_id: &str) -> Result<u64, BackendError> {
        self.check_available()?;
        Ok(self
            .slots
            .lock()
            .unwrap()
            .get(third_party_id)
            .copied()
            .unwrap_or(0))
    }

    async fn set_third_party_kind(
        &self,
        third_party_id: &str,
        is_programmatic: bool,
    ) -> Result<(), BackendError> {
        self.check_available()?;
        let mut third_parties = self.third_parties.lock().unwrap();
        let tp = third_parties
            .iter_mut()
            .find(|tp| tp.id == third_party_id)
            .ok_or_else(|| {
                BackendError::RequestFailed(format!("Unknown third party {}", third_party_id))
            })?;
        tp.is_programmatic = is_programmatic;
        Ok(())
    }
}

/// Mock content network for testing.
pub struct MockCatalystBackend {
    entities: Mutex<Vec<CatalystEntity>>,
    contents: Mutex<HashMap<String, Vec<u8>>>,
    fail_fetch_content: AtomicBool,
    fail_deploy: AtomicBool,
    deploy_calls: AtomicU32,
}

impl MockCatalystBackend {
    /// Create an empty mock node.
    pub fn new() -> Self {
        Self {
            entities: Mutex::new(Vec::new()),
            contents: Mutex::new(HashMap::new()),
            fail_fetch_content: AtomicBool::new(false),
            fail_deploy: AtomicBool::new(false),
            deploy_calls: AtomicU32::new(0),
        }
    }

    /// Seed deployed entities.
    pub fn with_entities(self, entities: Vec<CatalystEntity>) -> Self {
        *self.entities.lock().unwrap() = entities;
        self
    }

    /// Seed a content file.
    pub fn with_content(self, hash: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.contents.lock().unwrap().insert(hash.into(), bytes);
        self
    }

    /// Make content downloads fail.
    pub fn with_failing_content(self) -> Self {
        self.fail_fetch_content.store(true, Ordering::SeqCst);
        self
    }

    /// Make deployments fail.
    pub fn with_failing_deploy(self) -> Self {
        self.fail_deploy.store(true, Ordering::SeqCst);
        self
    }

    /// Number of deployments received.
    pub fn deploy_calls(&self) -> u32 {
        self.deploy_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCatalystBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalystBackend for MockCatalystBackend {
    async fn fetch_entities_by_pointers(
        &self,
        pointers: &[String],
    ) -> Result<Vec<CatalystEntity>, BackendError> {
        Ok(self
            .entities
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.pointers.iter().any(|p| pointers.contains(p)))
            .cloned()
            .collect())
    }

    async fn fetch_content(&self, hash: &str) -> Result<Vec<u8>, BackendError> {
        if self.fail_fetch_content.load(Ordering::SeqCst) {
            return Err(BackendError::NetworkError("Content fetch failed".to_string()));
        }
        self.contents
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .ok_or_else(|| BackendError::RequestFailed(format!("Content not found: {}", hash)))
    }

    async fn deploy_entity(&self, entity: CatalystEntity) -> Result<CatalystEntity, BackendError> {
        self.deploy_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deploy.load(Ordering::SeqCst) {
            return Err(BackendError::RequestFailed("Deployment rejected".to_string()));
        }
        self.entities.lock().unwrap().push(entity.clone());
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn an_item(id: &str, collection_id: &str, published: bool) -> Item {
        Item {
            id: id.to_string(),
            name: format!("item {id}"),
            collection_id: Some(collection_id.to_string()),
            urn: None,
            token_id: None,
            contents: HashMap::new(),
            is_published: published,
            is_approved: false,
            mappings: None,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            updated_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_pagination() {
        let items: Vec<Item> = (0..5).map(|i| an_item(&i.to_string(), "c-1", false)).collect();
        let backend = MockBuilderBackend::new().with_items(items);

        let page = backend.fetch_collection_items("c-1", 1, 2).await.unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 3);
        assert!(page.has_more());

        let last = backend.fetch_collection_items("c-1", 3, 2).await.unwrap();
        assert_eq!(last.results.len(), 1);
        assert!(!last.has_more());
    }

    #[tokio::test]
    async fn test_publish_flips_flag_and_opens_curation_for_pushes() {
        let backend = MockBuilderBackend::new().with_items(vec![
            an_item("new", "c-1", false),
            an_item("changed", "c-1", true),
        ]);

        let response = backend
            .publish_items("c-1", &["new".to_string(), "changed".to_string()])
            .await
            .unwrap();

        assert_eq!(backend.publish_calls(), 1);
        assert!(response.items.iter().all(|i| i.is_published));
        assert_eq!(response.item_curations.len(), 1);
        assert_eq!(response.item_curations[0].item_id, "changed");
        assert!(response.item_curations[0].is_pending());
    }

    #[tokio::test]
    async fn test_unavailable_backend_fails() {
        let backend = MockBuilderBackend::new().with_available(false);
        assert!(!backend.is_available().await);
        assert!(backend.fetch_third_parties("0xabc").await.is_err());
    }
}
