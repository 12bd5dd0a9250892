//! Infrastructure layer: persistence backends and the order lifecycle engine.
//!
//! The domain crates (`pantry-inventory`, `pantry-orders`) are pure logic;
//! this crate gives them a place to live. `store` defines the persistence
//! collaborator contract plus in-memory and JSON-file backends, and `service`
//! drives the full lifecycle (submit, approve, reject, stock adjustment)
//! through a single serialization point.

pub mod service;
pub mod store;

pub use service::{OrderService, ServiceError, ServiceResult};
pub use store::{InMemoryStateStore, JsonFileStore, StateStore, StoreError, seed_inventory};
