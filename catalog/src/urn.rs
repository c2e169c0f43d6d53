//! Typed decoding of asset URNs.
//!
//! A URN encodes network, registry type, and entity ids for an on-chain or
//! catalog asset. Decoding is pure, performs no I/O, and is total for
//! well-formed input; anything outside the known registry grammars fails
//! with [`InvalidUrnError`].
//!
//! Known grammars:
//!
//! ```text
//! urn:decentraland:off-chain:base-avatars:{name}
//! urn:decentraland:{network}:collections-v2:{contract}[:{token_id}]
//! urn:decentraland:{network}:collections-thirdparty:{tp_name}:{collection_id}[:{item_id}]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

const URN_PREFIX: &str = "urn";
const URN_NAMESPACE: &str = "decentraland";
const OFF_CHAIN: &str = "off-chain";
const BASE_AVATARS: &str = "base-avatars";
const COLLECTIONS_V2: &str = "collections-v2";
const COLLECTIONS_THIRDPARTY: &str = "collections-thirdparty";

/// Error raised when a string does not match any known registry grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidUrnError {
    /// The string is not a decentraland URN at all
    #[error("Invalid URN: {urn}")]
    Malformed { urn: String },

    /// The registry type is none of the known ones
    #[error("Unknown URN registry type: {urn}")]
    UnknownRegistry { urn: String },

    /// A required segment is missing
    #[error("URN is missing its {segment} segment: {urn}")]
    Incomplete { urn: String, segment: &'static str },
}

/// A URN parsed into typed components, keyed by registry type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodedUrn {
    /// A base avatar asset
    BaseAvatar {
        /// Avatar asset name
        name: String,
    },
    /// A standard (v2) collection, or an item within one when `token_id`
    /// is present
    CollectionsV2 {
        /// Network the collection lives on
        network: String,
        /// Collection contract address
        contract_address: String,
        /// Token id of the item, absent for collection URNs
        token_id: Option<String>,
    },
    /// A third-party (linked wearables) collection
    ThirdPartyCollection {
        /// Network the registry lives on
        network: String,
        /// Third-party name segment
        third_party_name: String,
        /// Collection id within the third party
        collection_id: String,
    },
    /// An item inside a third-party collection
    ThirdPartyItem {
        /// Network the registry lives on
        network: String,
        /// Third-party name segment
        third_party_name: String,
        /// Collection id within the third party
        collection_id: String,
        /// Item id within the collection
        item_id: String,
    },
}

impl DecodedUrn {
    /// Check if this URN belongs to the third-party registry.
    pub fn is_third_party(&self) -> bool {
        matches!(
            self,
            Self::ThirdPartyCollection { .. } | Self::ThirdPartyItem { .. }
        )
    }

    /// Reconstruct the ThirdParty id (the URN prefix up to the third-party
    /// name) for third-party URNs.
    pub fn third_party_id(&self) -> Option<String> {
        match self {
            Self::ThirdPartyCollection {
                network,
                third_party_name,
                ..
            }
            | Self::ThirdPartyItem {
                network,
                third_party_name,
                ..
            } => Some(format!(
                "{URN_PREFIX}:{URN_NAMESPACE}:{network}:{COLLECTIONS_THIRDPARTY}:{third_party_name}"
            )),
            _ => None,
        }
    }

    /// Replace the collection-id segment, leaving every other segment
    /// untouched. Returns `None` for registries without one.
    pub fn with_collection_id(self, new_collection_id: impl Into<String>) -> Option<Self> {
        match self {
            Self::ThirdPartyCollection {
                network,
                third_party_name,
                ..
            } => Some(Self::ThirdPartyCollection {
                network,
                third_party_name,
                collection_id: new_collection_id.into(),
            }),
            Self::ThirdPartyItem {
                network,
                third_party_name,
                item_id,
                ..
            } => Some(Self::ThirdPartyItem {
                network,
                third_party_name,
                collection_id: new_collection_id.into(),
                item_id,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BaseAvatar { name } => {
                write!(f, "{URN_PREFIX}:{URN_NAMESPACE}:{OFF_CHAIN}:{BASE_AVATARS}:{name}")
            }
            Self::CollectionsV2 {
                network,
                contract_address,
                token_id,
            } => {
                write!(
                    f,
                    "{URN_PREFIX}:{URN_NAMESPACE}:{network}:{COLLECTIONS_V2}:{contract_address}"
                )?;
                if let Some(token_id) = token_id {
                    write!(f, ":{token_id}")?;
                }
                Ok(())
            }
            Self::ThirdPartyCollection {
                network,
                third_party_name,
                collection_id,
            } => write!(
                f,
                "{URN_PREFIX}:{URN_NAMESPACE}:{network}:{COLLECTIONS_THIRDPARTY}:{third_party_name}:{collection_id}"
            ),
            Self::ThirdPartyItem {
                network,
                third_party_name,
                collection_id,
                item_id,
            } => write!(
                f,
                "{URN_PREFIX}:{URN_NAMESPACE}:{network}:{COLLECTIONS_THIRDPARTY}:{third_party_name}:{collection_id}:{item_id}"
            ),
        }
    }
}

/// Parse a URN string into its typed components.
pub fn decode_urn(urn: &str) -> Result<DecodedUrn, InvalidUrnError> {
    let malformed = || InvalidUrnError::Malformed {
        urn: urn.to_string(),
    };

    let mut segments = urn.split(':');
    if segments.next() != Some(URN_PREFIX) {
        return Err(malformed());
    }
    if segments.next() != Some(URN_NAMESPACE) {
        return Err(malformed());
    }

    let network = segments.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
    let registry = segments.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
    let rest: Vec<&str> = segments.collect();
    if rest.iter().any(|s| s.is_empty()) {
        return Err(malformed());
    }

    match (network, registry) {
        (OFF_CHAIN, BASE_AVATARS) => match rest.as_slice() {
            [name] => Ok(DecodedUrn::BaseAvatar {
                name: (*name).to_string(),
            }),
            _ => Err(malformed()),
        },
        (_, COLLECTIONS_V2) => match rest.as_slice() {
            [contract] => Ok(DecodedUrn::CollectionsV2 {
                network: network.to_string(),
                contract_address: (*contract).to_string(),
                token_id: None,
            }),
            [contract, token_id] => Ok(DecodedUrn::CollectionsV2 {
                network: network.to_string(),
                contract_address: (*contract).to_string(),
                token_id: Some((*token_id).to_string()),
            }),
            _ => Err(malformed()),
        },
        (_, COLLECTIONS_THIRDPARTY) => match rest.as_slice() {
            [] => Err(malformed()),
            [_] => Err(InvalidUrnError::Incomplete {
                urn: urn.to_string(),
                segment: "collection-id",
            }),
            [tp_name, collection_id] => Ok(DecodedUrn::ThirdPartyCollection {
                network: network.to_string(),
                third_party_name: (*tp_name).to_string(),
                collection_id: (*collection_id).to_string(),
            }),
            [tp_name, collection_id, item_id] => Ok(DecodedUrn::ThirdPartyItem {
                network: network.to_string(),
                third_party_name: (*tp_name).to_string(),
                collection_id: (*collection_id).to_string(),
                item_id: (*item_id).to_string(),
            }),
            _ => Err(malformed()),
        },
        _ => Err(InvalidUrnError::UnknownRegistry {
            urn: urn.to_string(),
        }),
    }
}

/// Answer "is this a third-party URN" without throwing.
pub fn is_third_party(urn: &str) -> bool {
    decode_urn(urn).map(|d| d.is_third_party()).unwrap_or(false)
}

/// Derive an item URN from its collection's URN and the item token id.
///
/// Item URNs are recomputed this way whenever a collection is saved
/// on-chain, so that they always reflect the collection's current address.
pub fn item_urn(collection_urn: &str, token_id: &str) -> Result<String, InvalidUrnError> {
    match decode_urn(collection_urn)? {
        DecodedUrn::CollectionsV2 {
            network,
            contract_address,
            ..
        } => Ok(DecodedUrn::CollectionsV2 {
            network,
            contract_address,
            token_id: Some(token_id.to_string()),
        }
        .to_string()),
        DecodedUrn::ThirdPartyCollection {
            network,
            third_party_name,
            collection_id,
        } => Ok(DecodedUrn::ThirdPartyItem {
            network,
            third_party_name,
            collection_id,
            item_id: token_id.to_string(),
        }
        .to_string()),
        _ => Err(InvalidUrnError::UnknownRegistry {
            urn: collection_urn.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base_avatar() {
        let decoded = decode_urn("urn:decentraland:off-chain:base-avatars:basemale").unwrap();
        assert_eq!(
            decoded,
            DecodedUrn::BaseAvatar {
                name: "basemale".to_string()
            }
        );
    }

    #[test]
    fn test_decode_collections_v2() {
        let decoded =
            decode_urn("urn:decentraland:goerli:collections-v2:0xc6d2000a7a1ddca92941f4e2b41360fe4ee2abd8")
                .unwrap();
        assert_eq!(
            decoded,
            DecodedUrn::CollectionsV2 {
                network: "goerli".to_string(),
                contract_address: "0xc6d2000a7a1ddca92941f4e2b41360fe4ee2abd8".to_string(),
                token_id: None,
            }
        );
    }

    #[test]
    fn test_decode_collections_v2_item() {
        let decoded =
            decode_urn("urn:decentraland:matic:collections-v2:0xabc:42").unwrap();
        assert_eq!(
            decoded,
            DecodedUrn::CollectionsV2 {
                network: "matic".to_string(),
                contract_address: "0xabc".to_string(),
                token_id: Some("42".to_string()),
            }
        );
    }

    #[test]
    fn test_decode_third_party_collection_and_item() {
        let collection =
            decode_urn("urn:decentraland:mumbai:collections-thirdparty:a-tp:a-collection").unwrap();
        assert!(collection.is_third_party());

        let item =
            decode_urn("urn:decentraland:mumbai:collections-thirdparty:a-tp:a-collection:an-item")
                .unwrap();
        assert_eq!(
            item,
            DecodedUrn::ThirdPartyItem {
                network: "mumbai".to_string(),
                third_party_name: "a-tp".to_string(),
                collection_id: "a-collection".to_string(),
                item_id: "an-item".to_string(),
            }
        );
    }

    #[test]
    fn test_third_party_urn_without_collection_id_is_incomplete() {
        let err = decode_urn("urn:decentraland:matic:collections-thirdparty:a-tp").unwrap_err();
        assert!(matches!(
            err,
            InvalidUrnError::Incomplete {
                segment: "collection-id",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_registry_fails() {
        let err = decode_urn("urn:decentraland:matic:collections-v9:0xabc").unwrap_err();
        assert!(matches!(err, InvalidUrnError::UnknownRegistry { .. }));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            decode_urn("not-a-urn"),
            Err(InvalidUrnError::Malformed { .. })
        ));
        assert!(matches!(
            decode_urn("urn:ethereum:mainnet:collections-v2:0xabc"),
            Err(InvalidUrnError::Malformed { .. })
        ));
    }

    #[test]
    fn test_is_third_party_predicate_never_throws() {
        assert!(is_third_party(
            "urn:decentraland:matic:collections-thirdparty:a-tp:a-collection"
        ));
        assert!(!is_third_party(
            "urn:decentraland:matic:collections-v2:0xabc"
        ));
        assert!(!is_third_party("garbage"));
    }

    #[test]
    fn test_third_party_id_reconstruction() {
        let decoded =
            decode_urn("urn:decentraland:mumbai:collections-thirdparty:thirdparty2:a-collection")
                .unwrap();
        assert_eq!(
            decoded.third_party_id().unwrap(),
            "urn:decentraland:mumbai:collections-thirdparty:thirdparty2"
        );
    }

    #[test]
    fn test_round_trip_with_changed_collection_id() {
        let original = "urn:decentraland:matic:collections-thirdparty:tp-id:tp-collection-id:tp-token-id";
        let decoded = decode_urn(original).unwrap();
        let reencoded = decoded.with_collection_id("another-collection").unwrap().to_string();
        assert_eq!(
            reencoded,
            "urn:decentraland:matic:collections-thirdparty:tp-id:another-collection:tp-token-id"
        );
        // Every other segment survives the rewrite
        assert_eq!(
            decode_urn(&reencoded).unwrap(),
            DecodedUrn::ThirdPartyItem {
                network: "matic".to_string(),
                third_party_name: "tp-id".to_string(),
                collection_id: "another-collection".to_string(),
                item_id: "tp-token-id".to_string(),
            }
        );
    }

    #[test]
    fn test_display_round_trip() {
        for urn in [
            "urn:decentraland:off-chain:base-avatars:basemale",
            "urn:decentraland:matic:collections-v2:0xabc",
            "urn:decentraland:matic:collections-v2:0xabc:7",
            "urn:decentraland:amoy:collections-thirdparty:tp:coll",
            "urn:decentraland:amoy:collections-thirdparty:tp:coll:item",
        ] {
            assert_eq!(decode_urn(urn).unwrap().to_string(), urn);
        }
    }

    #[test]
    fn test_item_urn_follows_collection() {
        assert_eq!(
            item_urn("urn:decentraland:goerli:collections-v2:0xdef", "9").unwrap(),
            "urn:decentraland:goerli:collections-v2:0xdef:9"
        );
        assert_eq!(
            item_urn("urn:decentraland:matic:collections-thirdparty:tp:coll", "an-item").unwrap(),
            "urn:decentraland:matic:collections-thirdparty:tp:coll:an-item"
        );
        assert!(item_urn("urn:decentraland:off-chain:base-avatars:basemale", "9").is_err());
    }
}
