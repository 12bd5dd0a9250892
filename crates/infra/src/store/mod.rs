//! Persistence collaborator contract.
//!
//! Storage here is deliberately primitive: two named collections, read and
//! written whole. Each read returns the entire current collection and each
//! write replaces it. The store itself offers **no** transactional isolation
//! across a read-modify-write sequence; that is the `OrderService`'s job,
//! which serializes every mutation behind one lock.

use std::sync::Arc;

use thiserror::Error;

use pantry_core::StockItemId;
use pantry_inventory::StockItem;
use pantry_orders::Order;

mod in_memory;
mod json_file;

pub use in_memory::InMemoryStateStore;
pub use json_file::JsonFileStore;

/// Storage operation error.
///
/// These are **infrastructure** failures (IO, encoding, poisoned locks), as
/// opposed to domain errors (validation, invariants).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io failed: {0}")]
    Io(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Two-collection state store: `inventory` and `orders`.
///
/// Implementations must return the seed catalog from `read_inventory` when no
/// prior inventory state exists, and an empty sequence from `read_orders`.
pub trait StateStore: Send + Sync {
    fn read_inventory(&self) -> Result<Vec<StockItem>, StoreError>;

    fn write_inventory(&self, items: Vec<StockItem>) -> Result<(), StoreError>;

    fn read_orders(&self) -> Result<Vec<Order>, StoreError>;

    fn write_orders(&self, orders: Vec<Order>) -> Result<(), StoreError>;
}

impl<S> StateStore for Arc<S>
where
    S: StateStore + ?Sized,
{
    fn read_inventory(&self) -> Result<Vec<StockItem>, StoreError> {
        (**self).read_inventory()
    }

    fn write_inventory(&self, items: Vec<StockItem>) -> Result<(), StoreError> {
        (**self).write_inventory(items)
    }

    fn read_orders(&self) -> Result<Vec<Order>, StoreError> {
        (**self).read_orders()
    }

    fn write_orders(&self, orders: Vec<Order>) -> Result<(), StoreError> {
        (**self).write_orders(orders)
    }
}

/// Seed catalog returned by `read_inventory` when no prior state exists.
pub fn seed_inventory() -> Vec<StockItem> {
    const SEED: [(&str, i64); 5] = [
        ("Tea", 50),
        ("Turkish coffee", 30),
        ("Nescafe", 40),
        ("Orange juice", 20),
        ("Anise", 25),
    ];

    SEED.iter()
        .map(|&(name, stock)| {
            // Static entries: non-blank names, non-negative stocks.
            StockItem::new(StockItemId::new(), name, stock)
                .expect("seed catalog entries are statically valid")
        })
        .collect()
}
