//! Orders domain module.
//!
//! Materialization of a cart snapshot into an order, and the order status
//! lattice, implemented as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod error;
pub mod order;
pub mod status;

pub use error::OrderError;
pub use order::{Order, OrderItem};
pub use status::{OrderStatus, PaymentStatus, StatusChange};
