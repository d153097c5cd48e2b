//! Infrastructure layer: transactional storage, database wiring, config.

pub mod config;
pub mod db;
pub mod store;

pub use config::{ConfigError, EngineConfig, StoreBackend};
pub use store::{CommerceStore, InMemoryStore, PostgresStore, StoreError, StoreTx};
