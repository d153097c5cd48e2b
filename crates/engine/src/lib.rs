//! Checkout engine.
//!
//! Composes the pure domain crates with a transactional [`CommerceStore`]:
//! every operation opens one transaction, applies domain rules and
//! conditional store updates, then commits or rolls back as a whole.
//!
//! [`CommerceStore`]: spectr_infra::CommerceStore

pub mod cart_snapshot;
pub mod engine;
pub mod error;
pub mod inventory_ledger;
pub mod order_lifecycle;
pub mod order_materializer;
pub mod payment_ledger;
pub mod stats_aggregator;

mod tx;

pub use engine::CheckoutEngine;
pub use error::{EngineError, Resource};
pub use order_lifecycle::OrderLifecycle;
pub use order_materializer::OrderMaterializer;
pub use payment_ledger::{ConfirmOutcome, PaymentLedger};
pub use stats_aggregator::StatsAggregator;
