//! Value objects: compared by value, never by identity.

/// Marker trait for immutable values such as [`crate::Money`] or a cart line.
///
/// Two value objects with equal fields are interchangeable. "Changing" one
/// means building a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
