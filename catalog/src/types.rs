//! Core records of the creator catalog.
//!
//! These types model the normalized state the derivation functions read:
//! items and collections as the creator edits them, third-party registries,
//! curation (review) records, and the content-addressed entities deployed to
//! the catalyst network. None of them is mutated by the derivation layer;
//! server-confirmed updates flow in through the orchestrator store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A creator asset (wearable or emote).
///
/// Created locally (unpublished, no URN), assigned a URN when its collection
/// is saved on-chain, and never deleted once published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Owning collection, if the item has been assigned to one
    pub collection_id: Option<String>,
    /// Asset URN; absent until the collection is created on-chain
    pub urn: Option<String>,
    /// On-chain token id within the collection
    pub token_id: Option<String>,
    /// Content map: file name → content hash
    pub contents: HashMap<String, String>,
    /// Whether the item has been published
    pub is_published: bool,
    /// Whether the item passed review
    pub is_approved: bool,
    /// Linked-contract mappings: network → contract addresses covered
    pub mappings: Option<HashMap<String, Vec<String>>>,
    /// When the item was created
    pub created_at: DateTime<Utc>,
    /// When the item was last updated
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Check if the item carries any linked-contract mappings.
    pub fn has_mappings(&self) -> bool {
        self.mappings.as_ref().is_some_and(|m| !m.is_empty())
    }
}

/// A named grouping of items.
///
/// The URN registry type determines whether the collection is standard or
/// third-party and is immutable once assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Collection URN; absent until on-chain creation
    pub urn: Option<String>,
    /// Owner address
    pub owner: String,
    /// Manager addresses
    pub managers: Vec<String>,
    /// Minter addresses
    pub minters: Vec<String>,
    /// Whether the collection has been published
    pub is_published: bool,
    /// Whether the collection passed on-chain approval
    pub is_approved: bool,
    /// Lock timestamp set when a publish is initiated
    pub lock: Option<DateTime<Utc>>,
    /// Server-reported item count, if known
    pub item_count: Option<u64>,
    /// When the collection was created
    pub created_at: DateTime<Utc>,
    /// When the collection was last updated
    pub updated_at: DateTime<Utc>,
    /// When the collection was last reviewed
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Collection {
    /// Check if the collection has ever been reviewed.
    pub fn has_reviews(&self) -> bool {
        self.reviewed_at.is_some_and(|reviewed| reviewed != self.created_at)
    }
}

/// A linked-wearables program owning a namespace of collections.
///
/// The id is itself a URN prefix; a collection belongs to at most one third
/// party, inferred by prefix match on its URN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThirdParty {
    /// Third-party id (a URN prefix)
    pub id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Merkle root of the approved item set
    pub root: String,
    /// Manager addresses
    pub managers: Vec<String>,
    /// Linked contract addresses
    pub contracts: Vec<String>,
    /// Whether the third party is approved
    pub is_approved: bool,
    /// Whether slots are consumed programmatically
    pub is_programmatic: bool,
    /// Whether the third party has published items
    pub published: bool,
    /// Slot allowance
    pub max_items: u64,
    /// Items consumed so far
    pub total_items: u64,
}

impl ThirdParty {
    /// Remaining publish slots.
    pub fn available_slots(&self) -> u64 {
        self.max_items.saturating_sub(self.total_items)
    }
}

/// Status of a curation (review) record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurationStatus {
    /// Submitted and waiting for a curator
    Pending,
    /// Accepted by a curator
    Approved,
    /// Rejected by a curator
    Rejected,
}

/// A review record for a single item revision.
///
/// One row can exist per revision; the most recent row for an item
/// determines its reviewed state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCuration {
    /// Unique identifier
    pub id: String,
    /// The item under review
    pub item_id: String,
    /// Review status
    pub status: CurationStatus,
    /// Content hash the review covers
    pub content_hash: Option<String>,
    /// When the curation was opened
    pub created_at: DateTime<Utc>,
    /// When the curation was last updated
    pub updated_at: DateTime<Utc>,
}

impl ItemCuration {
    /// Check if the curation is still waiting for review.
    pub fn is_pending(&self) -> bool {
        self.status == CurationStatus::Pending
    }
}

/// A review record for a whole collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionCuration {
    /// Unique identifier
    pub id: String,
    /// The collection under review
    pub collection_id: String,
    /// Review status
    pub status: CurationStatus,
    /// When the curation was opened
    pub created_at: DateTime<Utc>,
    /// When the curation was last updated
    pub updated_at: DateTime<Utc>,
}

impl CollectionCuration {
    /// Check if the curation is still waiting for review.
    pub fn is_pending(&self) -> bool {
        self.status == CurationStatus::Pending
    }
}

/// One file inside a deployed entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityContent {
    /// File key, matching the item content map key
    pub key: String,
    /// Content hash of the file
    pub hash: String,
}

/// An immutable deployed snapshot on the catalyst content network.
///
/// Entities are write-once and addressable by item pointer (URN). A missing
/// entity for a published and approved item indicates a deployment gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalystEntity {
    /// Content-derived entity id
    pub id: String,
    /// Pointers (URNs) this entity resolves for
    pub pointers: Vec<String>,
    /// Deployed content list
    pub content: Vec<EntityContent>,
    /// Deployment timestamp (unix millis)
    pub timestamp: i64,
}

impl CatalystEntity {
    /// Look up the deployed hash for a file key.
    pub fn hash_for(&self, key: &str) -> Option<&str> {
        self.content
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.hash.as_str())
    }
}

/// Derived synchronization state of an item or collection.
///
/// Never persisted; recomputed on every read from the item, its latest
/// curation, and the deployed entity's content hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Never published
    Unpublished,
    /// Latest curation is still pending
    UnderReview,
    /// Local content differs from the deployed entity, or no entity exists
    Unsynced,
    /// Deployed entity matches the local content
    Synced,
}

impl SyncStatus {
    /// Relevance of the status: lower values take precedence when folding
    /// statuses across a collection.
    ///
    /// This is a named table rather than declaration-order ordinals so that
    /// reordering the enum cannot change fold results.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Unpublished => 0,
            Self::UnderReview => 1,
            Self::Unsynced => 2,
            Self::Synced => 3,
        }
    }

    /// Get string representation for logs and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpublished => "unpublished",
            Self::UnderReview => "under_review",
            Self::Unsynced => "unsynced",
            Self::Synced => "synced",
        }
    }
}

/// Pick whichever status is more relevant (lower priority value).
///
/// Deterministic and symmetric: `most_relevant_status(a, b)` equals
/// `most_relevant_status(b, a)`.
pub fn most_relevant_status(a: SyncStatus, b: SyncStatus) -> SyncStatus {
    if a.priority() <= b.priority() {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_priority_order() {
        assert!(SyncStatus::Unpublished.priority() < SyncStatus::UnderReview.priority());
        assert!(SyncStatus::UnderReview.priority() < SyncStatus::Unsynced.priority());
        assert!(SyncStatus::Unsynced.priority() < SyncStatus::Synced.priority());
    }

    #[test]
    fn test_most_relevant_status_is_symmetric() {
        let statuses = [
            SyncStatus::Unpublished,
            SyncStatus::UnderReview,
            SyncStatus::Unsynced,
            SyncStatus::Synced,
        ];
        for a in statuses {
            for b in statuses {
                assert_eq!(most_relevant_status(a, b), most_relevant_status(b, a));
            }
        }
    }

    #[test]
    fn test_most_relevant_status_picks_worst_case() {
        assert_eq!(
            most_relevant_status(SyncStatus::Synced, SyncStatus::Unsynced),
            SyncStatus::Unsynced
        );
        assert_eq!(
            most_relevant_status(SyncStatus::UnderReview, SyncStatus::Unpublished),
            SyncStatus::Unpublished
        );
    }

    #[test]
    fn test_has_mappings_requires_a_nonempty_map() {
        let mut item = Item {
            id: "an-item".to_string(),
            name: "An Item".to_string(),
            collection_id: None,
            urn: None,
            token_id: None,
            contents: HashMap::new(),
            is_published: false,
            is_approved: false,
            mappings: None,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            updated_at: Utc.timestamp_opt(0, 0).unwrap(),
        };
        assert!(!item.has_mappings());

        item.mappings = Some(HashMap::new());
        assert!(!item.has_mappings());

        item.mappings = Some(HashMap::from([(
            "amoy".to_string(),
            vec!["0xabc".to_string()],
        )]));
        assert!(item.has_mappings());
    }

    #[test]
    fn test_has_reviews_ignores_the_creation_timestamp() {
        let created = Utc.timestamp_opt(100, 0).unwrap();
        let mut collection = Collection {
            id: "a-collection".to_string(),
            name: "A Collection".to_string(),
            urn: None,
            owner: "0xowner".to_string(),
            managers: vec![],
            minters: vec![],
            is_published: false,
            is_approved: false,
            lock: None,
            item_count: None,
            created_at: created,
            updated_at: created,
            reviewed_at: None,
        };
        assert!(!collection.has_reviews());

        // Servers backfill reviewed_at with created_at for never-reviewed rows
        collection.reviewed_at = Some(created);
        assert!(!collection.has_reviews());

        collection.reviewed_at = Some(Utc.timestamp_opt(200, 0).unwrap());
        assert!(collection.has_reviews());
    }

    #[test]
    fn test_status_wire_format_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&SyncStatus::UnderReview).unwrap(),
            "\"under_review\""
        );
        assert_eq!(
            serde_json::to_string(&CurationStatus::Pending).unwrap(),
            "\"pending\""
        );
        let parsed: SyncStatus = serde_json::from_str("\"unsynced\"").unwrap();
        assert_eq!(parsed, SyncStatus::Unsynced);
    }

    #[test]
    fn test_entity_hash_lookup() {
        let entity = CatalystEntity {
            id: "Qm1".to_string(),
            pointers: vec!["urn:decentraland:matic:collections-v2:0xabc:1".to_string()],
            content: vec![EntityContent {
                key: "model.glb".to_string(),
                hash: "QmA".to_string(),
            }],
            timestamp: 0,
        };
        assert_eq!(entity.hash_for("model.glb"), Some("QmA"));
        assert_eq!(entity.hash_for("missing.png"), None);
    }

    #[test]
    fn test_available_slots_saturates() {
        let tp = ThirdParty {
            id: "urn:decentraland:matic:collections-thirdparty:a-tp".to_string(),
            name: "a tp".to_string(),
            description: String::new(),
            root: String::new(),
            managers: vec![],
            contracts: vec![],
            is_approved: true,
            is_programmatic: false,
            published: false,
            max_items: 10,
            total_items: 25,
        };
        assert_eq!(tp.available_slots(), 0);
    }
}
