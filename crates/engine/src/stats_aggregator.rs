use tracing::{debug, instrument};

use spectr_infra::{CommerceStore, StoreTx};
use spectr_stats::{AppStats, StatsDelta};

use crate::tx::finish;
use crate::EngineError;

/// Apply `delta` inside an existing transaction.
///
/// The increment is additive in the store, so concurrent deltas never lose
/// each other's updates.
pub async fn apply(tx: &mut dyn StoreTx, delta: &StatsDelta) -> Result<(), EngineError> {
    if delta.is_empty() {
        return Ok(());
    }
    tx.increment_stats(delta).await?;
    debug!(?delta, "stats incremented");
    Ok(())
}

/// Running business totals.
#[derive(Debug, Clone)]
pub struct StatsAggregator<S> {
    store: S,
}

impl<S: CommerceStore> StatsAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self), err)]
    pub async fn increment(&self, delta: StatsDelta) -> Result<(), EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = apply(tx.as_mut(), &delta).await;
        finish(tx, outcome).await
    }

    /// Count one new account.
    pub async fn record_signup(&self) -> Result<(), EngineError> {
        self.increment(StatsDelta::signup()).await
    }

    #[instrument(skip(self), err)]
    pub async fn snapshot(&self) -> Result<AppStats, EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.stats().await.map_err(EngineError::from);
        finish(tx, outcome).await
    }
}
