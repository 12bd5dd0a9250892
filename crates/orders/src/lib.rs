//! Order domain module: carts and the order lifecycle.
//!
//! This crate contains business rules for cart assembly and order state
//! transitions, implemented purely as deterministic domain logic (no IO, no
//! storage). The transactional approve/reject orchestration lives in
//! `pantry-infra`, which drives these types.

pub mod cart;
pub mod order;

pub use cart::{Cart, CartLine, aggregate_quantities};
pub use order::{Order, OrderStatus};
