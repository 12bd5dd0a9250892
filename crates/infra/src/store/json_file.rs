use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use pantry_inventory::StockItem;
use pantry_orders::Order;

use super::{StateStore, StoreError, seed_inventory};

/// JSON-file state store: one document per collection under a directory.
///
/// `inventory.json` and `orders.json` each hold a whole collection, rewritten
/// on every store write. A missing inventory document is materialized from
/// the seed catalog and persisted immediately so the seeded item ids stay
/// stable across reads.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(Self { dir })
    }

    fn inventory_path(&self) -> PathBuf {
        self.dir.join("inventory.json")
    }

    fn orders_path(&self) -> PathBuf {
        self.dir.join("orders.json")
    }

    fn read_doc<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path).map_err(|e| StoreError::Io(e.to_string()))?;
        let value = serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Some(value))
    }

    fn write_doc<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(path, raw).map_err(|e| StoreError::Io(e.to_string()))
    }
}

impl StateStore for JsonFileStore {
    fn read_inventory(&self) -> Result<Vec<StockItem>, StoreError> {
        if let Some(items) = Self::read_doc(&self.inventory_path())? {
            return Ok(items);
        }

        let seed = seed_inventory();
        Self::write_doc(&self.inventory_path(), &seed)?;
        Ok(seed)
    }

    fn write_inventory(&self, items: Vec<StockItem>) -> Result<(), StoreError> {
        Self::write_doc(&self.inventory_path(), &items)
    }

    fn read_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(Self::read_doc(&self.orders_path())?.unwrap_or_default())
    }

    fn write_orders(&self, orders: Vec<Order>) -> Result<(), StoreError> {
        Self::write_doc(&self.orders_path(), &orders)
    }
}
