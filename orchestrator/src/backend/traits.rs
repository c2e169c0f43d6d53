//! Core traits for remote backends.
//!
//! This module defines the `BuilderBackend` and `CatalystBackend` traits -
//! the primary abstractions over the catalog server and the content network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use catalog::types::{
    CatalystEntity, Collection, CurationStatus, Item, ItemCuration, ThirdParty,
};

/// Error types for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Backend is not available
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// A page of results from a paginated endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// The records of this page
    pub results: Vec<T>,
    /// Total records across all pages
    pub total: u64,
    /// Total page count
    pub pages: u64,
    /// Current page, 1-based
    pub page: u64,
    /// Page size requested
    pub limit: u64,
}

impl<T> Paginated<T> {
    /// Whether pages remain after this one.
    pub fn has_more(&self) -> bool {
        self.page < self.pages
    }
}

/// Server response to a publish submission.
///
/// Carries the confirmed records the store merges back: items now flagged
/// as published, plus the curations opened for pushed changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResponse {
    /// Items in their server-confirmed state
    pub items: Vec<Item>,
    /// Curations created or reopened by the submission
    pub item_curations: Vec<ItemCuration>,
}

/// Core trait for the catalog server.
///
/// Abstracts the remote builder API so workflows can run against an
/// in-memory double in tests.
#[async_trait]
pub trait BuilderBackend: Send + Sync {
    /// Check if the backend is currently reachable.
    async fn is_available(&self) -> bool;

    /// Fetch one page of the collections visible to an address.
    async fn fetch_collections(
        &self,
        address: &str,
        page: u64,
        limit: u64,
    ) -> Result<Paginated<Collection>, BackendError>;

    /// Fetch one page of a collection's items.
    async fn fetch_collection_items(
        &self,
        collection_id: &str,
        page: u64,
        limit: u64,
    ) -> Result<Paginated<Item>, BackendError>;

    /// Fetch every curation of a collection's items.
    async fn fetch_item_curations(
        &self,
        collection_id: &str,
    ) -> Result<Vec<ItemCuration>, BackendError>;

    /// Move an item's curation to a new status.
    async fn update_item_curation(
        &self,
        item_id: &str,
        status: CurationStatus,
    ) -> Result<ItemCuration, BackendError>;

    /// Submit items for publishing and/or push their changes.
    async fn publish_items(
        &self,
        collection_id: &str,
        item_ids: &[String],
    ) -> Result<PublishResponse, BackendError>;

    /// Redeploy already-approved items at given content hashes.
    async fn rescue_items(
        &self,
        collection_id: &str,
        item_ids: &[String],
        content_hashes: &[String],
    ) -> Result<Vec<Item>, BackendError>;

    /// Fetch the third parties an address manages.
    async fn fetch_third_parties(&self, address: &str) -> Result<Vec<ThirdParty>, BackendError>;

    /// Fetch the remaining slot allowance of a third party.
    async fn fetch_slots(&self, third_party_id: &str) -> Result<u64, BackendError>;

    /// Switch a third party between programmatic and regular slot usage.
    async fn set_third_party_kind(
        &self,
        third_party_id: &str,
        is_programmatic: bool,
    ) -> Result<(), BackendError>;
}

/// Core trait for the content network.
#[async_trait]
pub trait CatalystBackend: Send + Sync {
    /// Resolve deployed entities by their pointers (URNs).
    async fn fetch_entities_by_pointers(
        &self,
        pointers: &[String],
    ) -> Result<Vec<CatalystEntity>, BackendError>;

    /// Download a content file by its hash.
    async fn fetch_content(&self, hash: &str) -> Result<Vec<u8>, BackendError>;

    /// Deploy an entity to the network.
    async fn deploy_entity(&self, entity: CatalystEntity) -> Result<CatalystEntity, BackendError>;
}
