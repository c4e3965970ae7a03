//! Entity trait: identity that survives field edits.

/// Entity marker + minimal interface.
///
/// Records coming from the backing store (products, snapshot rows) are keyed
/// by their identifier; every by-key update goes through this id.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
