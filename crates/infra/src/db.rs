//! Database wiring: connection pools, migrations, store selection.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::config::{EngineConfig, StoreBackend};
use crate::store::{CommerceStore, InMemoryStore, PostgresStore, StoreError};

const COMMERCE_SCHEMA: &str = include_str!("../migrations/0001_commerce.sql");

const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Connect to Postgres, retrying every 2 s up to `retries` extra attempts.
#[instrument(skip(database_url), err)]
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    retries: u32,
) -> Result<PgPool, StoreError> {
    let mut attempt = 0;
    loop {
        let result = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await;

        match result {
            Ok(pool) => return Ok(pool),
            Err(err) if attempt < retries => {
                attempt += 1;
                warn!(attempt, error = %err, "database not ready, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(err) => {
                return Err(StoreError::Unavailable(format!(
                    "could not connect after {} attempts: {}",
                    attempt + 1,
                    err
                )));
            }
        }
    }
}

/// Apply the commerce schema. Idempotent.
#[instrument(skip(pool), err)]
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(COMMERCE_SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))?;
    info!("commerce schema is up to date");
    Ok(())
}

/// Build the store selected by `config`.
pub async fn open_store(config: &EngineConfig) -> Result<Arc<dyn CommerceStore>, StoreError> {
    match &config.backend {
        StoreBackend::Memory => {
            info!("using in-memory store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Postgres { database_url } => {
            let pool = create_pool(database_url, config.max_connections, config.connect_retries).await?;
            if config.run_migrations {
                migrate(&pool).await?;
            }
            info!(max_connections = config.max_connections, "using postgres store");
            Ok(Arc::new(PostgresStore::new(pool)))
        }
    }
}
