//! Inventory domain module.
//!
//! Products and their stock rules, as deterministic domain logic (no IO, no
//! storage). Stores apply these rules inside their own atomic primitives.

pub mod product;

pub use product::{validate_quantity, InsufficientStock, Product};
