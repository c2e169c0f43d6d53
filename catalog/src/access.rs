//! Collection classification and access predicates.
//!
//! All address comparisons are case-insensitive; wallet addresses arrive in
//! mixed casing depending on the wallet provider.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Collection;
use crate::urn::{decode_urn, DecodedUrn};

/// Classification of a collection by its URN registry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionType {
    /// A standard (v2 or base-avatar) collection
    Standard,
    /// A third-party (linked wearables) collection
    ThirdParty,
}

/// Error raised when a collection cannot be classified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// The collection has not been assigned a URN yet
    #[error("Collection {collection_id} has no URN to classify")]
    MissingUrn { collection_id: String },

    /// The URN does not map to a known collection type
    #[error("Tried to get a collection type from an invalid URN: {urn}")]
    InvalidUrn { urn: String },
}

/// Determine the collection type from its URN.
pub fn collection_type(collection: &Collection) -> Result<CollectionType, ClassifyError> {
    let urn = collection.urn.as_deref().ok_or_else(|| ClassifyError::MissingUrn {
        collection_id: collection.id.clone(),
    })?;

    match decode_urn(urn) {
        Ok(DecodedUrn::ThirdPartyCollection { .. }) => Ok(CollectionType::ThirdParty),
        Ok(DecodedUrn::CollectionsV2 { .. }) | Ok(DecodedUrn::BaseAvatar { .. }) => {
            Ok(CollectionType::Standard)
        }
        _ => Err(ClassifyError::InvalidUrn {
            urn: urn.to_string(),
        }),
    }
}

/// Check if a collection belongs to the third-party registry.
pub fn is_third_party_collection(collection: &Collection) -> bool {
    matches!(collection_type(collection), Ok(CollectionType::ThirdParty))
}

/// Case-insensitive address equality.
pub fn addresses_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Check if the address appears in a list, case-insensitively.
pub fn address_in(addresses: &[String], address: &str) -> bool {
    addresses.iter().any(|a| addresses_equal(a, address))
}

/// Check if the address owns the collection.
pub fn is_owner(collection: &Collection, address: Option<&str>) -> bool {
    address.is_some_and(|addr| addresses_equal(&collection.owner, addr))
}

/// Check if the address is in the collection's minter set.
pub fn is_minter(collection: &Collection, address: Option<&str>) -> bool {
    address.is_some_and(|addr| address_in(&collection.minters, addr))
}

/// Check if the address is in the collection's manager set.
pub fn is_manager(collection: &Collection, address: Option<&str>) -> bool {
    address.is_some_and(|addr| address_in(&collection.managers, addr))
}

/// Check if the address may see the collection at all: owner, manager or
/// minter.
pub fn can_see_collection(collection: &Collection, address: &str) -> bool {
    std::iter::once(&collection.owner)
        .chain(collection.managers.iter())
        .chain(collection.minters.iter())
        .any(|a| addresses_equal(a, address))
}

/// Check if the address may mint items: requires on-chain approval on top of
/// owner/minter rights.
pub fn can_mint_collection_items(collection: &Collection, address: Option<&str>) -> bool {
    collection.is_approved && (is_owner(collection, address) || is_minter(collection, address))
}

/// Check if the address may manage items: owner or manager.
pub fn can_manage_collection_items(collection: &Collection, address: Option<&str>) -> bool {
    is_owner(collection, address) || is_manager(collection, address)
}

/// Check if the collection is locked for edits.
///
/// The lock taken when a publish starts holds for one day and only matters
/// while the collection is still unpublished.
pub fn is_locked(collection: &Collection, now: DateTime<Utc>) -> bool {
    match collection.lock {
        Some(lock) if !collection.is_published => lock + Duration::days(1) > now,
        _ => false,
    }
}
