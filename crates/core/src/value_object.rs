//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two instances
/// with the same attribute values are the same value. Entities, by contrast,
/// carry identity: two entities with the same id are the same entity even
/// when their attributes differ.
///
/// A cart line (item id + name snapshot) is the canonical value object in
/// this system: it has no lifecycle of its own, and "modifying" one means
/// replacing it.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
