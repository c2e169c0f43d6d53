//! Atelier Orchestrator - Catalog Workflow Engine
//!
//! Drives the effectful half of the creator-catalog pipeline:
//! - Trait-based backends over the catalog server and catalyst network
//! - A single-writer store of the derived [`catalog`] state snapshot
//! - Workflows with loading markers, chunked progress and latest-wins runs
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               Workflows                 │
//! │   (fetch / publish / rescue / deploy)   │
//! └────────┬───────────────────┬────────────┘
//!          │                   │
//!          ▼                   ▼
//! ┌─────────────────┐   ┌─────────────┐
//! │ BuilderBackend  │   │ CatalogStore│
//! │ CatalystBackend │   │ (snapshot)  │
//! └─────────────────┘   └─────────────┘
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod features;
pub mod store;
pub mod workflow;
pub mod workflows;

// Re-export main types for convenience
pub use backend::{BackendError, BuilderBackend, CatalystBackend, Paginated, PublishResponse};
pub use config::OrchestratorConfig;
pub use error::{ThirdPartyError, WorkflowError};
pub use features::{ApplicationName, FeatureFlags, StaticFlags, LINKED_WEARABLES_PAYMENTS};
pub use store::CatalogStore;
pub use workflow::{WorkflowEvent, WorkflowKind, WorkflowRunner};
pub use workflows::Workflows;
