//! Immutable state snapshot and the selectors that read it.
//!
//! The snapshot is the normalized, read-mostly view of everything fetched so
//! far: items, collections, curations, deployed entities and third parties,
//! all keyed by id. Derivation functions take `&StateSnapshot` and never
//! mutate it; the orchestrator store is the only writer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::access::{can_manage_collection_items, can_see_collection, address_in};
use crate::types::{
    CatalystEntity, Collection, CollectionCuration, Item, ItemCuration, ThirdParty,
};
use crate::urn::{decode_urn, DecodedUrn};

/// Error raised when a third-party lookup is attempted on a URN that does
/// not belong to the third-party registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("URN is not a third party URN")]
pub struct NotThirdPartyUrn;

/// Normalized in-memory state, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Connected wallet address, if signed in
    pub address: Option<String>,
    /// Items by item id
    pub items: HashMap<String, Item>,
    /// Collections by collection id
    pub collections: HashMap<String, Collection>,
    /// Item curations grouped by collection id
    pub item_curations: HashMap<String, Vec<ItemCuration>>,
    /// Collection curations by collection id
    pub collection_curations: HashMap<String, CollectionCuration>,
    /// Deployed entities by entity id
    pub entities: HashMap<String, CatalystEntity>,
    /// Third parties by third-party id
    pub third_parties: HashMap<String, ThirdParty>,
    /// Latest error recorded against the collection slice
    pub collection_error: Option<String>,
}

impl StateSnapshot {
    /// Items belonging to a collection.
    pub fn collection_items(&self, collection_id: &str) -> Vec<&Item> {
        self.items
            .values()
            .filter(|item| item.collection_id.as_deref() == Some(collection_id))
            .collect()
    }

    /// Curations recorded for a collection's items.
    pub fn collection_item_curations(&self, collection_id: &str) -> &[ItemCuration] {
        self.item_curations
            .get(collection_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Locate the deployed entity addressing the given pointer, if any.
    pub fn entity_by_pointer(&self, pointer: &str) -> Option<&CatalystEntity> {
        self.entities
            .values()
            .find(|entity| entity.pointers.iter().any(|p| p == pointer))
    }

    /// Server-reported item count for a collection, 0 when unknown.
    pub fn collection_item_count(&self, collection_id: &str) -> u64 {
        self.collections
            .get(collection_id)
            .and_then(|c| c.item_count)
            .unwrap_or(0)
    }

    /// Resolve the third party a collection belongs to.
    ///
    /// Fails when the collection URN is not a third-party URN; returns
    /// `None` when the URN is valid but the third party is not in state.
    pub fn collection_third_party(
        &self,
        collection: &Collection,
    ) -> Result<Option<&ThirdParty>, NotThirdPartyUrn> {
        let urn = collection.urn.as_deref().ok_or(NotThirdPartyUrn)?;
        self.third_party_by_urn(urn)
    }

    /// Resolve the third party an item belongs to.
    ///
    /// Items without a URN have no third party yet; a non-third-party URN is
    /// an error.
    pub fn item_third_party(&self, item: &Item) -> Result<Option<&ThirdParty>, NotThirdPartyUrn> {
        match item.urn.as_deref() {
            None => Ok(None),
            Some(urn) => self.third_party_by_urn(urn),
        }
    }

    fn third_party_by_urn(&self, urn: &str) -> Result<Option<&ThirdParty>, NotThirdPartyUrn> {
        let decoded = decode_urn(urn).map_err(|_| NotThirdPartyUrn)?;
        let third_party_id = decoded.third_party_id().ok_or(NotThirdPartyUrn)?;
        Ok(self.third_parties.get(&third_party_id))
    }

    /// Check if the connected wallet manages any third party.
    pub fn is_third_party_manager(&self) -> bool {
        match self.address.as_deref() {
            Some(address) => self
                .third_parties
                .values()
                .any(|tp| address_in(&tp.managers, address)),
            None => false,
        }
    }

    /// Third parties managed by the connected wallet.
    pub fn wallet_third_parties(&self) -> Vec<&ThirdParty> {
        let Some(address) = self.address.as_deref() else {
            return Vec::new();
        };
        self.third_parties
            .values()
            .filter(|tp| address_in(&tp.managers, address))
            .collect()
    }

    /// Check if the address can view and edit a collection.
    ///
    /// True when the address owns or manages the collection directly, or is
    /// a manager of the third party the collection's URN resolves to.
    pub fn has_view_and_edit_rights(&self, address: &str, collection: &Collection) -> bool {
        let manages_third_party = match collection
            .urn
            .as_deref()
            .and_then(|urn| decode_urn(urn).ok())
        {
            Some(decoded @ DecodedUrn::ThirdPartyCollection { .. })
            | Some(decoded @ DecodedUrn::ThirdPartyItem { .. }) => decoded
                .third_party_id()
                .and_then(|id| self.third_parties.get(&id))
                .is_some_and(|tp| address_in(&tp.managers, address)),
            _ => false,
        };

        manages_third_party || can_manage_collection_items(collection, Some(address))
    }

    /// Collections the address is authorized to work with.
    ///
    /// Standard collections require owner/manager/minter membership;
    /// third-party collections require managership of a third party that is
    /// actually present in state.
    pub fn authorized_collections(&self, address: &str) -> Vec<&Collection> {
        self.collections
            .values()
            .filter(|collection| match self.collection_third_party(collection) {
                Ok(Some(tp)) => address_in(&tp.managers, address),
                Ok(None) => false,
                Err(NotThirdPartyUrn) => can_see_collection(collection, address),
            })
            .collect()
    }
}
