use tracing::warn;

use spectr_infra::StoreTx;

use crate::EngineError;

/// Commit on success, roll back on failure. Rollback failures are logged, not returned.
pub(crate) async fn finish<T>(
    tx: Box<dyn StoreTx>,
    outcome: Result<T, EngineError>,
) -> Result<T, EngineError> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            discard(tx).await;
            Err(err)
        }
    }
}

/// Roll back a transaction whose work is not wanted.
pub(crate) async fn discard(tx: Box<dyn StoreTx>) {
    if let Err(err) = tx.rollback().await {
        warn!(error = %err, "rollback failed");
    }
}
