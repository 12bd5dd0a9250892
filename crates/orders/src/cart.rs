use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, DomainResult, StockItemId, ValueObject, find_by_id};
use pantry_inventory::StockItem;

/// One requested unit of an item: id plus a name snapshot taken at add time.
///
/// Multiplicity encodes quantity (three lines with the same `item_id` mean
/// quantity 3). Persisted orders keep these snapshots even after catalog
/// renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: StockItemId,
    pub name: String,
}

impl ValueObject for CartLine {}

/// Session-local list of pending line selections.
///
/// A cart is owned by one session and never shared or persisted; it needs no
/// locking. Availability is checked optimistically against the inventory
/// snapshot the caller passes in: the cart's own count of an item acts as an
/// unlocked reservation that never exceeds the stock it was shown. Two
/// concurrent carts are not mutually aware; submission re-validates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `item_id`, validated against `inventory`.
    ///
    /// An unknown id is a silent no-op. Adding succeeds only while
    /// `stock > in_cart_count`; at the boundary the add is rejected with the
    /// item's name and the cart is left untouched.
    pub fn add(&mut self, item_id: StockItemId, inventory: &[StockItem]) -> DomainResult<()> {
        let Some(item) = find_by_id(inventory, item_id) else {
            return Ok(());
        };

        let in_cart = self.quantity_of(item_id);
        if item.stock() <= in_cart {
            return Err(DomainError::insufficient_stock(item.name()));
        }

        self.lines.push(CartLine {
            item_id,
            name: item.name().to_string(),
        });
        Ok(())
    }

    /// Remove and return the line at `index`.
    pub fn remove(&mut self, index: usize) -> DomainResult<CartLine> {
        if index >= self.lines.len() {
            return Err(DomainError::not_found());
        }
        Ok(self.lines.remove(index))
    }

    /// Empty the cart. Invoked by successful submission.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Count of lines referencing `item_id`.
    pub fn quantity_of(&self, item_id: StockItemId) -> i64 {
        self.lines.iter().filter(|l| l.item_id == item_id).count() as i64
    }
}

/// Sum lines per item id into total requested quantity per item.
///
/// Shared by submission re-validation and the approval transaction.
pub fn aggregate_quantities(lines: &[CartLine]) -> HashMap<StockItemId, i64> {
    let mut totals = HashMap::new();
    for line in lines {
        *totals.entry(line.item_id).or_insert(0) += 1;
    }
    totals
}
