//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A cart holds at most one entity per identifier; the identifier is what
/// operations address, never the position in the cart.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
