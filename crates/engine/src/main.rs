use anyhow::Context;
use tracing::info;

use spectr_engine::CheckoutEngine;
use spectr_infra::{db, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    spectr_observability::init();

    let config = EngineConfig::from_env().context("loading configuration")?;
    info!(?config, "starting checkout engine");

    let store = db::open_store(&config).await.context("opening store")?;
    let engine = CheckoutEngine::new(store);

    let stats = engine
        .stats_aggregator()
        .snapshot()
        .await
        .context("reading stats")?;
    info!(
        total_users = stats.total_users,
        total_sales = stats.total_sales,
        total_products_sold = stats.total_products_sold,
        total_revenue = %stats.total_revenue,
        "checkout engine ready"
    );

    Ok(())
}
