//! Error types for the orchestration layer.
//!
//! Pure derivation errors stay in the `catalog` crate; everything here is
//! raised by workflows and converted to recorded failures at the workflow
//! boundary. Network failures never crash the process.

use crate::backend::traits::BackendError;

/// Domain errors carrying the offending item for retry or display.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ThirdPartyError {
    /// Downloading the entity's contents failed
    #[error("Failed to download the entity's contents for item {item_id}")]
    BuildEntity { item_id: String },

    /// Deploying the entity failed
    #[error("Failed to deploy the entity for item {item_id}")]
    Deployment { item_id: String },

    /// Updating the curation failed
    #[error("Failed to update curation for item {item_id}")]
    CurationUpdate { item_id: String },
}

impl ThirdPartyError {
    /// The item the failure belongs to.
    pub fn item_id(&self) -> &str {
        match self {
            Self::BuildEntity { item_id }
            | Self::Deployment { item_id }
            | Self::CurationUpdate { item_id } => item_id,
        }
    }
}

/// Errors surfaced by workflow runs.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A backend call failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A per-item third-party operation failed
    #[error(transparent)]
    ThirdParty(#[from] ThirdPartyError),

    /// The submission is blocked by eligibility rules
    #[error("Publishing is blocked: {reason}")]
    Blocked { reason: String },

    /// The referenced record is not in state
    #[error("Unknown {kind}: {id}")]
    NotFound { kind: &'static str, id: String },
}
