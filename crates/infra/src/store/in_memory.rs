use std::sync::RwLock;

use pantry_inventory::StockItem;
use pantry_orders::Order;

use super::{StateStore, StoreError, seed_inventory};

/// In-memory state store.
///
/// Intended for tests/dev. `None` means "no prior state": the seed catalog is
/// materialized and latched on first inventory read, so every caller sees the
/// same item ids from then on.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    inventory: RwLock<Option<Vec<StockItem>>>,
    orders: RwLock<Option<Vec<Order>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for InMemoryStateStore {
    fn read_inventory(&self) -> Result<Vec<StockItem>, StoreError> {
        {
            let guard = self.inventory.read().map_err(|_| StoreError::LockPoisoned)?;
            if let Some(items) = guard.as_ref() {
                return Ok(items.clone());
            }
        }

        let mut guard = self.inventory.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard.get_or_insert_with(seed_inventory).clone())
    }

    fn write_inventory(&self, items: Vec<StockItem>) -> Result<(), StoreError> {
        let mut guard = self.inventory.write().map_err(|_| StoreError::LockPoisoned)?;
        *guard = Some(items);
        Ok(())
    }

    fn read_orders(&self) -> Result<Vec<Order>, StoreError> {
        let guard = self.orders.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn write_orders(&self, orders: Vec<Order>) -> Result<(), StoreError> {
        let mut guard = self.orders.write().map_err(|_| StoreError::LockPoisoned)?;
        *guard = Some(orders);
        Ok(())
    }
}
