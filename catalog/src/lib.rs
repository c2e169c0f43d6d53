//! Catalog domain core for Atelier.
//!
//! This crate holds the pure half of the creator-catalog pipeline: typed URN
//! decoding, collection classification and access predicates, the
//! sync-status resolver, the publish-eligibility engine and the
//! review-threshold policy. Everything operates over an immutable
//! [`StateSnapshot`]; no function here performs I/O or mutates state.
//!
//! # Key components
//!
//! - [`urn::decode_urn`]: parse asset identifiers into typed components
//! - [`status::status_by_collection_id`]: worst-case sync status per collection
//! - [`publish::publish_plan`]: which items to publish or push, and what blocks it
//! - [`review::ReviewPolicy`]: manual-review sample size for large batches
//!
//! # Data flow
//!
//! ```text
//! StateSnapshot ──► Sync-Status Resolver ──► Publish-Eligibility Engine
//!      ▲                                              │
//!      └────────── orchestrator store ◄───────────────┘
//! ```

pub mod access;
pub mod hashing;
pub mod publish;
pub mod review;
pub mod snapshot;
pub mod status;
pub mod types;
pub mod urn;

// Re-export main types
pub use access::{collection_type, is_third_party_collection, ClassifyError, CollectionType};
pub use publish::{publish_plan, PublishAction, PublishBlock, PublishPlan};
pub use review::{threshold_to_review, ReviewPolicy};
pub use snapshot::{NotThirdPartyUrn, StateSnapshot};
pub use status::{
    has_collection_missing_entities, resolve_item_status, status_by_collection_id,
    status_by_item_id, unsynced_collection_error, UNSYNCED_COLLECTION_ERROR_PREFIX,
};
pub use types::{
    most_relevant_status, CatalystEntity, Collection, CollectionCuration, CurationStatus,
    EntityContent, Item, ItemCuration, SyncStatus, ThirdParty,
};
pub use urn::{decode_urn, is_third_party, item_urn, DecodedUrn, InvalidUrnError};
