//! Entity trait: records with identity.

/// Anything persisted under its own identifier (products, orders, payments).
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
