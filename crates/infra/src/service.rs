//! Order lifecycle engine.
//!
//! `OrderService` turns a validated cart into a persisted order and later
//! drives the order through approval or rejection, mutating inventory under
//! an all-or-nothing deduction rule. The store exposes no isolation of its
//! own (whole-collection read/write), so every read-modify-write sequence
//! here runs under one `Mutex`: submit, approve, reject and the stock
//! adjustments are linearizable with respect to each other. Carts are
//! session-local and never cross this boundary.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use pantry_core::{DomainError, OrderId, StockItemId, find_by_id, find_by_id_mut};
use pantry_inventory::StockItem;
use pantry_orders::{Cart, Order, aggregate_quantities};

use crate::store::{StateStore, StoreError};

/// Engine-level error: a domain rule failed or storage failed.
///
/// Every failure aborts the single operation and leaves both collections
/// unchanged; callers (the rendering layer) can display and retry.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// The order lifecycle engine.
///
/// Generic over the persistence collaborator so tests and deployments pick
/// their backend (`InMemoryStateStore`, `JsonFileStore`) without touching the
/// lifecycle rules.
pub struct OrderService<S: StateStore> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: StateStore> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Submit the cart as a new pending order.
    ///
    /// The cart may be long-lived and stale, so every distinct item is
    /// re-validated against a fresh inventory read before anything is
    /// persisted. On any shortfall the submission aborts whole, naming the
    /// failing line, and the cart is left untouched; on success the order is
    /// appended and the cart cleared.
    pub fn submit(
        &self,
        employee_name: &str,
        note: Option<String>,
        cart: &mut Cart,
    ) -> ServiceResult<OrderId> {
        if cart.is_empty() {
            return Err(DomainError::EmptyCart.into());
        }

        let _guard = self.lock()?;
        let inventory = self.store.read_inventory()?;

        for (item_id, qty) in aggregate_quantities(cart.lines()) {
            let available = stock_of(&inventory, item_id);
            if available < qty {
                let name = cart
                    .lines()
                    .iter()
                    .find(|l| l.item_id == item_id)
                    .map(|l| l.name.clone())
                    .unwrap_or_else(|| item_id.to_string());
                warn!(item = %name, requested = qty, available, "submission aborted on stale cart");
                return Err(DomainError::insufficient_stock(name).into());
            }
        }

        let order = Order::new(
            OrderId::new(),
            employee_name,
            note,
            cart.lines().to_vec(),
            Utc::now(),
        )?;
        let order_id = order.id_typed();
        let line_count = order.items().len();

        let mut orders = self.store.read_orders()?;
        orders.push(order);
        self.store.write_orders(orders)?;
        cart.clear();

        info!(%order_id, employee = employee_name, lines = line_count, "order submitted");
        Ok(order_id)
    }

    /// Approve a pending order, deducting its aggregated quantities.
    ///
    /// Two phases under one lock: first every aggregated `(item, qty)` is
    /// validated against current stock; only if all passed is any deduction
    /// applied. Deductions land in a local copy and nothing is
    /// persisted until the order transition has succeeded too, so a partial
    /// deduction is never observable.
    ///
    /// An unknown order id is a no-op; an already-processed order is a
    /// conflict.
    pub fn approve(&self, order_id: OrderId, approver: &str) -> ServiceResult<()> {
        let _guard = self.lock()?;

        let mut orders = self.store.read_orders()?;
        let Some(order) = find_by_id_mut(&mut orders, order_id) else {
            debug!(%order_id, "approve: order not found, ignoring");
            return Ok(());
        };
        if !order.is_pending() {
            return Err(DomainError::conflict("order already processed").into());
        }

        let requested = order.requested_quantities();
        let mut inventory = self.store.read_inventory()?;

        // Validation phase: every line must be satisfiable before any stock
        // is touched.
        for (&item_id, &qty) in &requested {
            let available = stock_of(&inventory, item_id);
            if available < qty {
                let name = order
                    .line_name(item_id)
                    .map(str::to_string)
                    .unwrap_or_else(|| item_id.to_string());
                warn!(%order_id, item = %name, requested = qty, available, "approval aborted on shortfall");
                return Err(DomainError::insufficient_stock(name).into());
            }
        }

        // Apply phase.
        for (&item_id, &qty) in &requested {
            if let Some(item) = find_by_id_mut(&mut inventory, item_id) {
                item.deduct(qty)?;
            }
        }

        order.approve(approver, Utc::now())?;
        info!(%order_id, approver, items = requested.len(), "order approved");

        self.store.write_inventory(inventory)?;
        self.store.write_orders(orders)?;
        Ok(())
    }

    /// Reject a pending order. No inventory effect.
    pub fn reject(&self, order_id: OrderId, approver: &str) -> ServiceResult<()> {
        let _guard = self.lock()?;

        let mut orders = self.store.read_orders()?;
        let Some(order) = find_by_id_mut(&mut orders, order_id) else {
            debug!(%order_id, "reject: order not found, ignoring");
            return Ok(());
        };

        order.reject(approver, Utc::now())?;
        info!(%order_id, approver, "order rejected");

        self.store.write_orders(orders)?;
        Ok(())
    }

    /// Increase an item's stock. Unknown item ids are ignored.
    pub fn add_stock(&self, item_id: StockItemId, qty: i64) -> ServiceResult<()> {
        let _guard = self.lock()?;

        let mut inventory = self.store.read_inventory()?;
        let Some(item) = find_by_id_mut(&mut inventory, item_id) else {
            debug!(%item_id, "add_stock: item not found, ignoring");
            return Ok(());
        };

        item.receive(qty)?;
        debug!(%item_id, qty, stock = item.stock(), "stock received");

        self.store.write_inventory(inventory)?;
        Ok(())
    }

    /// Decrease an item's stock. Unknown item ids are ignored.
    pub fn decrease_stock(&self, item_id: StockItemId, qty: i64) -> ServiceResult<()> {
        let _guard = self.lock()?;

        let mut inventory = self.store.read_inventory()?;
        let Some(item) = find_by_id_mut(&mut inventory, item_id) else {
            debug!(%item_id, "decrease_stock: item not found, ignoring");
            return Ok(());
        };

        item.deduct(qty)?;
        debug!(%item_id, qty, stock = item.stock(), "stock deducted");

        self.store.write_inventory(inventory)?;
        Ok(())
    }

    /// Add a new catalog item with an initial stock level.
    pub fn create_item(&self, name: &str, initial_stock: i64) -> ServiceResult<StockItemId> {
        let item = StockItem::new(StockItemId::new(), name, initial_stock)?;
        let item_id = item.id_typed();

        let _guard = self.lock()?;
        let mut inventory = self.store.read_inventory()?;
        inventory.push(item);
        self.store.write_inventory(inventory)?;

        info!(%item_id, name, "catalog item created");
        Ok(item_id)
    }

    /// Delete a catalog item. Unknown item ids are ignored. Persisted orders
    /// keep their line snapshots regardless.
    pub fn remove_item(&self, item_id: StockItemId) -> ServiceResult<()> {
        let _guard = self.lock()?;

        let mut inventory = self.store.read_inventory()?;
        let before = inventory.len();
        inventory.retain(|i| i.id_typed() != item_id);
        if inventory.len() == before {
            debug!(%item_id, "remove_item: item not found, ignoring");
            return Ok(());
        }

        self.store.write_inventory(inventory)?;
        info!(%item_id, "catalog item removed");
        Ok(())
    }

    /// Rate an approved order (1–5). Unknown order ids are ignored.
    pub fn rate_order(&self, order_id: OrderId, stars: u8) -> ServiceResult<()> {
        let _guard = self.lock()?;

        let mut orders = self.store.read_orders()?;
        let Some(order) = find_by_id_mut(&mut orders, order_id) else {
            debug!(%order_id, "rate_order: order not found, ignoring");
            return Ok(());
        };

        order.rate(stars)?;
        self.store.write_orders(orders)?;
        Ok(())
    }

    /// Current stock list.
    pub fn inventory(&self) -> ServiceResult<Vec<StockItem>> {
        Ok(self.store.read_inventory()?)
    }

    /// Every order, in storage order.
    pub fn orders(&self) -> ServiceResult<Vec<Order>> {
        Ok(self.store.read_orders()?)
    }

    /// Pending orders, newest first.
    pub fn pending_orders(&self) -> ServiceResult<Vec<Order>> {
        let mut pending: Vec<Order> = self
            .store
            .read_orders()?
            .into_iter()
            .filter(Order::is_pending)
            .collect();
        pending.sort_by_key(|o| std::cmp::Reverse(o.submitted_at()));
        Ok(pending)
    }

    /// Approved and rejected orders, most recently processed first.
    pub fn processed_orders(&self) -> ServiceResult<Vec<Order>> {
        let mut processed: Vec<Order> = self
            .store
            .read_orders()?
            .into_iter()
            .filter(|o| !o.is_pending())
            .collect();
        processed.sort_by_key(|o| std::cmp::Reverse(o.processed_at()));
        Ok(processed)
    }

    /// One employee's orders, newest first.
    pub fn orders_for(&self, employee_name: &str) -> ServiceResult<Vec<Order>> {
        let mut mine: Vec<Order> = self
            .store
            .read_orders()?
            .into_iter()
            .filter(|o| o.employee_name() == employee_name)
            .collect();
        mine.sort_by_key(|o| std::cmp::Reverse(o.submitted_at()));
        Ok(mine)
    }
}

fn stock_of(inventory: &[StockItem], item_id: StockItemId) -> i64 {
    find_by_id(inventory, item_id)
        .map(StockItem::stock)
        .unwrap_or(0)
}
