use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, DomainResult, Entity, OrderId, StockItemId};

use crate::cart::{CartLine, aggregate_quantities};

/// Order status lifecycle: `pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Approved,
    Rejected,
}

/// A persisted request for a set of items.
///
/// `items` is an immutable snapshot of the cart at submission time; catalog
/// changes after submission never retroactively alter an order's labels.
/// Exactly one transition out of `Pending` is allowed. The inventory effect
/// of that transition belongs to the engine; this type only guards the state
/// machine and stamps the audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    employee_name: String,
    items: Vec<CartLine>,
    note: Option<String>,
    status: OrderStatus,
    submitted_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
    processed_by: Option<String>,
    rating: Option<u8>,
}

impl Order {
    pub fn new(
        id: OrderId,
        employee_name: impl Into<String>,
        note: Option<String>,
        items: Vec<CartLine>,
        submitted_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let employee_name = employee_name.into();
        if employee_name.trim().is_empty() {
            return Err(DomainError::validation("employee name cannot be empty"));
        }
        if items.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        Ok(Self {
            id,
            employee_name,
            items,
            note: note.filter(|n| !n.trim().is_empty()),
            status: OrderStatus::Pending,
            submitted_at,
            processed_at: None,
            processed_by: None,
            rating: None,
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn employee_name(&self) -> &str {
        &self.employee_name
    }

    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, OrderStatus::Pending)
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    pub fn processed_by(&self) -> Option<&str> {
        self.processed_by.as_deref()
    }

    pub fn rating(&self) -> Option<u8> {
        self.rating
    }

    /// Total requested quantity per item id.
    pub fn requested_quantities(&self) -> HashMap<StockItemId, i64> {
        aggregate_quantities(&self.items)
    }

    /// Name snapshot for `item_id` from this order's own lines, for error
    /// reporting that survives catalog deletions.
    pub fn line_name(&self, item_id: StockItemId) -> Option<&str> {
        self.items
            .iter()
            .find(|l| l.item_id == item_id)
            .map(|l| l.name.as_str())
    }

    /// Transition `pending → approved` and stamp the audit fields.
    ///
    /// The caller must have already validated and deducted stock; approving
    /// here is only the state-machine half of the transaction.
    pub fn approve(&mut self, processed_by: impl Into<String>, at: DateTime<Utc>) -> DomainResult<()> {
        self.transition(OrderStatus::Approved, processed_by, at)
    }

    /// Transition `pending → rejected` and stamp the audit fields.
    pub fn reject(&mut self, processed_by: impl Into<String>, at: DateTime<Utc>) -> DomainResult<()> {
        self.transition(OrderStatus::Rejected, processed_by, at)
    }

    fn transition(
        &mut self,
        next: OrderStatus,
        processed_by: impl Into<String>,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.is_pending() {
            return Err(DomainError::conflict("order already processed"));
        }
        self.status = next;
        self.processed_at = Some(at);
        self.processed_by = Some(processed_by.into());
        Ok(())
    }

    /// Record a 1–5 rating. Only approved orders can be rated.
    pub fn rate(&mut self, stars: u8) -> DomainResult<()> {
        if self.status != OrderStatus::Approved {
            return Err(DomainError::invariant("only approved orders can be rated"));
        }
        if !(1..=5).contains(&stars) {
            return Err(DomainError::validation("rating must be between 1 and 5"));
        }
        self.rating = Some(stars);
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
