//! Backend abstractions for the orchestrator.
//!
//! Workflows talk to two remote systems: the catalog server (collections,
//! items, curations, third parties) and the catalyst content network
//! (deployed entities). Each is behind a trait with an HTTP implementation
//! and an in-memory mock for tests.

pub mod http;
pub mod mock;
pub mod traits;

pub use http::{HttpBuilderBackend, HttpCatalystBackend};
pub use mock::{MockBuilderBackend, MockCatalystBackend};
pub use traits::{
    BackendError, BuilderBackend, CatalystBackend, Paginated, PublishResponse,
};
