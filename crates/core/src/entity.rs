//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Collections of entities in this system are plain ordered sequences, so
/// lookup goes through the free functions below rather than a keyed map;
/// callers keep whatever ordering the store handed them.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Find an entity in a sequence by id.
pub fn find_by_id<E: Entity>(items: &[E], id: E::Id) -> Option<&E> {
    items.iter().find(|e| *e.id() == id)
}

/// Find an entity in a sequence by id, mutably.
pub fn find_by_id_mut<E: Entity>(items: &mut [E], id: E::Id) -> Option<&mut E> {
    items.iter_mut().find(|e| *e.id() == id)
}
