use spectr_cart::CartSnapshot;
use spectr_core::UserId;
use spectr_infra::StoreTx;

use crate::EngineError;

/// Read the user's cart inside `tx` and freeze it into a snapshot.
pub async fn take(tx: &mut dyn StoreTx, user_id: UserId) -> Result<CartSnapshot, EngineError> {
    let items = tx.cart_items(user_id).await?;
    Ok(CartSnapshot::from_items(user_id, &items)?)
}
