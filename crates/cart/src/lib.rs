//! Cart domain module (no IO, no HTTP, no storage).
//!
//! Cart rows are written by external cart operations; checkout only reads a
//! [`CartSnapshot`] of them and clears them once an order is placed.

pub mod item;
pub mod snapshot;

pub use item::CartItem;
pub use snapshot::{CartLine, CartSnapshot};
