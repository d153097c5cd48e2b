//! Transactional storage boundary for the checkout engine.
//!
//! Every read and write happens inside a [`StoreTx`]. Multi-row changes
//! (placement, cancellation with restock, payment confirmation with stats)
//! commit together or not at all; dropping a transaction discards it.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{CommerceStore, StoreError, StoreTx};
