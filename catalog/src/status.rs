//! Sync-status resolution.
//!
//! Derives the synchronization state of items and collections by comparing
//! local item records, their content hashes, the deployed catalyst entity
//! snapshot, and pending curation records. Everything here is a pure read
//! over the [`StateSnapshot`].

use std::collections::HashMap;
use tracing::debug;

use crate::snapshot::StateSnapshot;
use crate::types::{most_relevant_status, CatalystEntity, Item, ItemCuration, SyncStatus};

/// Sentinel prefix marking a collection error as user-actionable.
pub const UNSYNCED_COLLECTION_ERROR_PREFIX: &str = "UnsyncedCollection:";

/// The most recent curation record among the given ones.
pub fn latest_curation(curations: &[ItemCuration]) -> Option<&ItemCuration> {
    curations.iter().max_by_key(|c| c.created_at)
}

/// Resolve the sync status of a single item.
///
/// Ordered rules:
/// 1. Never published → [`SyncStatus::Unpublished`].
/// 2. Latest curation pending → [`SyncStatus::UnderReview`].
/// 3. Every content hash matches the deployed entity → [`SyncStatus::Synced`];
///    any mismatch, or no entity at all → [`SyncStatus::Unsynced`].
pub fn resolve_item_status(
    item: &Item,
    curations: &[ItemCuration],
    entity: Option<&CatalystEntity>,
) -> SyncStatus {
    if !item.is_published {
        return SyncStatus::Unpublished;
    }

    if latest_curation(curations).is_some_and(|c| c.is_pending()) {
        return SyncStatus::UnderReview;
    }

    match entity {
        Some(entity) => {
            let in_sync = item
                .contents
                .iter()
                .all(|(key, hash)| entity.hash_for(key) == Some(hash.as_str()));
            if in_sync {
                SyncStatus::Synced
            } else {
                SyncStatus::Unsynced
            }
        }
        None => SyncStatus::Unsynced,
    }
}

/// Resolve the sync status of every item in the snapshot.
pub fn status_by_item_id(snapshot: &StateSnapshot) -> HashMap<String, SyncStatus> {
    snapshot
        .items
        .values()
        .map(|item| {
            let curations: Vec<ItemCuration> = item
                .collection_id
                .as_deref()
                .map(|cid| {
                    snapshot
                        .collection_item_curations(cid)
                        .iter()
                        .filter(|c| c.item_id == item.id)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            let entity = item
                .urn
                .as_deref()
                .and_then(|urn| snapshot.entity_by_pointer(urn));

            (item.id.clone(), resolve_item_status(item, &curations, entity))
        })
        .collect()
}

/// Resolve the most relevant status per collection.
///
/// Folds each collection's item statuses with [`most_relevant_status`]; a
/// pending collection-level curation also counts as under review.
pub fn status_by_collection_id(snapshot: &StateSnapshot) -> HashMap<String, SyncStatus> {
    let item_statuses = status_by_item_id(snapshot);
    let mut by_collection: HashMap<String, SyncStatus> = HashMap::new();

    for item in snapshot.items.values() {
        let (Some(collection_id), Some(status)) =
            (item.collection_id.as_deref(), item_statuses.get(&item.id))
        else {
            continue;
        };
        by_collection
            .entry(collection_id.to_string())
            .and_modify(|current| *current = most_relevant_status(*current, *status))
            .or_insert(*status);
    }

    for (collection_id, curation) in &snapshot.collection_curations {
        if curation.is_pending() {
            by_collection
                .entry(collection_id.clone())
                .and_modify(|current| {
                    *current = most_relevant_status(*current, SyncStatus::UnderReview)
                })
                .or_insert(SyncStatus::UnderReview);
        }
    }

    by_collection
}

/// Check whether a published and approved collection has items with no
/// deployed entity behind their pointer.
///
/// Returns false immediately when the collection is missing, unpublished or
/// unapproved; draft collections never pay for entity lookups.
pub fn has_collection_missing_entities(snapshot: &StateSnapshot, collection_id: &str) -> bool {
    let Some(collection) = snapshot.collections.get(collection_id) else {
        return false;
    };
    if !collection.is_published || !collection.is_approved {
        return false;
    }

    let missing = snapshot.collection_items(collection_id).iter().any(|item| {
        match item.urn.as_deref() {
            Some(urn) => snapshot.entity_by_pointer(urn).is_none(),
            // A published collection item without a URN has nothing deployed
            None => true,
        }
    });

    if missing {
        debug!(collection_id, "Collection has items with missing entities");
    }
    missing
}

/// Surface the stored collection error only when it is the known
/// user-actionable unsynced-collection error.
///
/// Unprefixed errors from the same slice are intentionally hidden from this
/// surface.
pub fn unsynced_collection_error(snapshot: &StateSnapshot) -> Option<&str> {
    snapshot
        .collection_error
        .as_deref()
        .filter(|error| error.starts_with(UNSYNCED_COLLECTION_ERROR_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CollectionCuration, CurationStatus, EntityContent};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap as Map;

    fn an_item(id: &str, collection_id: &str, urn: Option<&str>, published: bool) -> Item {
        Item {
            id: id.to_string(),
            name: format!("item {id}"),
            collection_id: Some(collection_id.to_string()),
            urn: urn.map(String::from),
            token_id: None,
            contents: Map::new(),
            is_published: published,
            is_approved: published,
            mappings: None,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            updated_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    fn a_curation(item_id: &str, status: CurationStatus, created_secs: i64) -> ItemCuration {
        ItemCuration {
            id: format!("curation-{item_id}-{created_secs}"),
            item_id: item_id.to_string(),
            status,
            content_hash: None,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
            updated_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    fn an_entity(id: &str, pointer: &str, content: &[(&str, &str)]) -> CatalystEntity {
        CatalystEntity {
            id: id.to_string(),
            pointers: vec![pointer.to_string()],
            content: content
                .iter()
                .map(|(key, hash)| EntityContent {
                    key: (*key).to_string(),
                    hash: (*hash).to_string(),
                })
                .collect(),
            timestamp: 0,
        }
    }

    #[test]
    fn test_unpublished_wins_over_everything() {
        let mut item = an_item("a", "c", Some("urn:x"), false);
        item.contents.insert("file.ext".to_string(), "QmA".to_string());
        let curations = vec![a_curation("a", CurationStatus::Pending, 10)];
        let entity = an_entity("Qm1", "urn:x", &[("file.ext", "QmA")]);

        assert_eq!(
            resolve_item_status(&item, &curations, Some(&entity)),
            SyncStatus::Unpublished
        );
    }

    #[test]
    fn test_pending_curation_means_under_review_even_when_hashes_match() {
        let urn = "urn:decentraland:matic:collections-v2:0xabc:1";
        let mut item = an_item("a", "c", Some(urn), true);
        item.contents.insert("file.ext".to_string(), "QmA".to_string());
        let entity = an_entity("Qm1", urn, &[("file.ext", "QmA")]);

        let curations = vec![
            a_curation("a", CurationStatus::Approved, 5),
            a_curation("a", CurationStatus::Pending, 10),
        ];
        assert_eq!(
            resolve_item_status(&item, &curations, Some(&entity)),
            SyncStatus::UnderReview
        );
    }

    #[test]
    fn test_latest_curation_decides() {
        let urn = "urn:decentraland:matic:collections-v2:0xabc:1";
        let mut item = an_item("a", "c", Some(urn), true);
        item.contents.insert("file.ext".to_string(), "QmA".to_string());
        let entity = an_entity("Qm1", urn, &[("file.ext", "QmA")]);

        // The pending row is older than the approved one
        let curations = vec![
            a_curation("a", CurationStatus::Pending, 5),
            a_curation("a", CurationStatus::Approved, 10),
        ];
        assert_eq!(
            resolve_item_status(&item, &curations, Some(&entity)),
            SyncStatus::Synced
        );
    }

    #[test]
    fn test_matching_hashes_resolve_synced() {
        let urn = "urn:decentraland:matic:collections-v2:0xabc:1";
        let mut item = an_item("a", "c", Some(urn), true);
        item.contents.insert("model.glb".to_string(), "QmA".to_string());
        item.contents.insert("thumb.png".to_string(), "QmB".to_string());
        let entity = an_entity("Qm1", urn, &[("model.glb", "QmA"), ("thumb.png", "QmB")]);

        assert_eq!(
            resolve_item_status(&item, &[], Some(&entity)),
            SyncStatus::Synced
        );
    }

    #[test]
    fn test_mismatched_or_missing_hash_resolves_unsynced() {
        let urn = "urn:decentraland:matic:collections-v2:0xabc:1";
        let mut item = an_item("a", "c", Some(urn), true);
        item.contents.insert("model.glb".to_string(), "QmA_new".to_string());

        let stale = an_entity("Qm1", urn, &[("model.glb", "QmA")]);
        assert_eq!(
            resolve_item_status(&item, &[], Some(&stale)),
            SyncStatus::Unsynced
        );

        let incomplete = an_entity("Qm1", urn, &[("other.png", "QmC")]);
        assert_eq!(
            resolve_item_status(&item, &[], Some(&incomplete)),
            SyncStatus::Unsynced
        );

        assert_eq!(resolve_item_status(&item, &[], None), SyncStatus::Unsynced);
    }

    #[test]
    fn test_status_by_collection_id_folds_worst_case() {
        // Collection "0": one synced item and one with a newer local hash.
        // Collection "1": a published item with no entity, but a pending
        // collection curation takes precedence.
        let mut snapshot = StateSnapshot::default();

        let urn_a = "urn:decentraland:matic:collections-v2:0xaddr:aTokenId";
        let urn_b = "urn:decentraland:matic:collections-v2:0xaddr:anotherTokenId";

        let mut item0 = an_item("0", "0", Some(urn_a), true);
        item0.contents.insert("file.ext".to_string(), "QmA".to_string());
        let mut item1 = an_item("1", "0", Some(urn_b), true);
        item1.contents.insert("file.ext".to_string(), "QmB_new".to_string());
        let item2 = an_item("2", "1", None, true);

        for item in [item0, item1, item2] {
            snapshot.items.insert(item.id.clone(), item);
        }
        snapshot.item_curations.insert(
            "0".to_string(),
            vec![
                a_curation("0", CurationStatus::Approved, 1),
                a_curation("1", CurationStatus::Rejected, 1),
            ],
        );
        snapshot.collection_curations.insert(
            "1".to_string(),
            CollectionCuration {
                id: "1".to_string(),
                collection_id: "1".to_string(),
                status: CurationStatus::Pending,
                created_at: Utc.timestamp_opt(0, 0).unwrap(),
                updated_at: Utc.timestamp_opt(0, 0).unwrap(),
            },
        );
        snapshot
            .entities
            .insert("Qm1".to_string(), an_entity("Qm1", urn_a, &[("file.ext", "QmA")]));
        snapshot
            .entities
            .insert("Qm2".to_string(), an_entity("Qm2", urn_b, &[("file.ext", "QmB")]));

        let statuses = status_by_collection_id(&snapshot);
        assert_eq!(statuses.get("0"), Some(&SyncStatus::Unsynced));
        assert_eq!(statuses.get("1"), Some(&SyncStatus::UnderReview));
    }

    #[test]
    fn test_missing_entities_requires_published_and_approved() {
        let mut snapshot = StateSnapshot::default();
        let mut collection = crate::types::Collection {
            id: "collection-id".to_string(),
            name: "Test Collection".to_string(),
            urn: None,
            owner: "0x123".to_string(),
            managers: vec![],
            minters: vec![],
            is_published: true,
            is_approved: true,
            lock: None,
            item_count: None,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            updated_at: Utc.timestamp_opt(0, 0).unwrap(),
            reviewed_at: None,
        };
        snapshot
            .collections
            .insert(collection.id.clone(), collection.clone());

        for (id, pointer) in [("item1", "urn:item1"), ("item2", "urn:item2"), ("item3", "urn:item3")]
        {
            snapshot
                .items
                .insert(id.to_string(), an_item(id, "collection-id", Some(pointer), true));
        }
        snapshot
            .entities
            .insert("entity1".to_string(), an_entity("entity1", "urn:item1", &[]));
        snapshot
            .entities
            .insert("entity2".to_string(), an_entity("entity2", "urn:item2", &[]));

        // item3 has no entity behind its pointer
        assert!(has_collection_missing_entities(&snapshot, "collection-id"));

        snapshot
            .entities
            .insert("entity3".to_string(), an_entity("entity3", "urn:item3", &[]));
        assert!(!has_collection_missing_entities(&snapshot, "collection-id"));

        // Either flag unset short-circuits to false, entity data ignored
        snapshot.entities.clear();
        collection.is_published = false;
        snapshot
            .collections
            .insert(collection.id.clone(), collection.clone());
        assert!(!has_collection_missing_entities(&snapshot, "collection-id"));

        collection.is_published = true;
        collection.is_approved = false;
        snapshot
            .collections
            .insert(collection.id.clone(), collection);
        assert!(!has_collection_missing_entities(&snapshot, "collection-id"));
    }

    #[test]
    fn test_unsynced_collection_error_filter() {
        let mut snapshot = StateSnapshot::default();
        assert_eq!(unsynced_collection_error(&snapshot), None);

        snapshot.collection_error = Some("Not an unsynced collection error".to_string());
        assert_eq!(unsynced_collection_error(&snapshot), None);

        let message = format!("{UNSYNCED_COLLECTION_ERROR_PREFIX} Some error");
        snapshot.collection_error = Some(message.clone());
        assert_eq!(unsynced_collection_error(&snapshot), Some(message.as_str()));
    }
}
