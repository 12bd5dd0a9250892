//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation,
/// invariants, availability). Infrastructure concerns belong elsewhere.
///
/// `NotFound` deserves a note: most engine entry points treat an absent item
/// or order id as a silent no-op rather than returning this variant. It is
/// still part of the taxonomy for the places where absence *is* an error
/// (e.g. removing a cart line at an out-of-range position).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. blank name, rating out of range).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// Requested quantity exceeds what is currently available.
    ///
    /// Carries the identity of the offending item so callers can tell the
    /// user which line failed.
    #[error("insufficient stock for {item}")]
    InsufficientStock { item: String },

    /// A stock adjustment quantity was non-positive.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// An order was submitted from a cart with no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A conflicting state change (e.g. re-processing a terminal order).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_stock(item: impl Into<String>) -> Self {
        Self::InsufficientStock { item: item.into() }
    }
}
