//! `spectr-core`: shared domain primitives for the checkout engine.
//!
//! Pure domain code only: identifiers, money, the domain error model.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CartItemId, OrderId, OrderItemId, PaymentId, ProductId, UserId};
pub use money::Money;
pub use value_object::ValueObject;
