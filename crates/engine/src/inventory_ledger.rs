//! Stock mutations. Always run inside a caller-owned transaction.

use tracing::{instrument, warn};

use spectr_core::ProductId;
use spectr_infra::StoreTx;
use spectr_inventory::validate_quantity;

use crate::EngineError;

/// Reserve `quantity` units of a live product.
///
/// The decrement is a single conditional update, so concurrent reservations
/// against the same product can never drive stock below zero.
#[instrument(skip(tx), err)]
pub async fn reserve(
    tx: &mut dyn StoreTx,
    product_id: ProductId,
    quantity: i64,
) -> Result<(), EngineError> {
    validate_quantity(quantity)?;

    if tx.reserve_stock(product_id, quantity).await? {
        Ok(())
    } else {
        Err(EngineError::InsufficientStock { product_id })
    }
}

/// Return `quantity` units to a product, deleted or not.
#[instrument(skip(tx), err)]
pub async fn release(
    tx: &mut dyn StoreTx,
    product_id: ProductId,
    quantity: i64,
) -> Result<(), EngineError> {
    validate_quantity(quantity)?;

    let rows = tx.release_stock(product_id, quantity).await?;
    if rows == 0 {
        warn!(%product_id, quantity, "restock target no longer exists");
    }
    Ok(())
}
