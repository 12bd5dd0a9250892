use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, DomainResult, Entity, StockItemId};

/// A stock-keeping record: name + integer quantity on hand.
///
/// The single hard invariant is `stock >= 0`, enforced at construction and at
/// every mutation. Quantities arrive from external input as parsed integers,
/// so adjustment methods take `i64` and reject non-positive values themselves
/// rather than trusting the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    id: StockItemId,
    name: String,
    stock: i64,
}

impl StockItem {
    pub fn new(id: StockItemId, name: impl Into<String>, stock: i64) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if stock < 0 {
            return Err(DomainError::InvalidQuantity(stock));
        }
        Ok(Self { id, name, stock })
    }

    pub fn id_typed(&self) -> StockItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// Increase stock by a positive quantity.
    pub fn receive(&mut self, qty: i64) -> DomainResult<()> {
        if qty <= 0 {
            return Err(DomainError::InvalidQuantity(qty));
        }
        self.stock += qty;
        Ok(())
    }

    /// Decrease stock by a positive quantity, never below zero.
    pub fn deduct(&mut self, qty: i64) -> DomainResult<()> {
        if qty <= 0 {
            return Err(DomainError::InvalidQuantity(qty));
        }
        if qty > self.stock {
            return Err(DomainError::insufficient_stock(self.name.clone()));
        }
        self.stock -= qty;
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        self.name = name;
        Ok(())
    }
}

impl Entity for StockItem {
    type Id = StockItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
