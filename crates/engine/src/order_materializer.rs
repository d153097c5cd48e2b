use chrono::Utc;
use tracing::{debug, info, instrument, warn, Span};

use spectr_core::{OrderId, UserId};
use spectr_infra::{CommerceStore, StoreTx};
use spectr_orders::Order;

use crate::tx::finish;
use crate::{cart_snapshot, inventory_ledger, EngineError};

/// Turns a user's cart into a pending order in one transaction.
#[derive(Debug, Clone)]
pub struct OrderMaterializer<S> {
    store: S,
}

impl<S: CommerceStore> OrderMaterializer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Place an order from the user's current cart.
    ///
    /// Snapshot, order insert, per-line stock reservation and cart clearing all
    /// commit together or not at all. Any failure leaves stock, cart and orders
    /// exactly as they were.
    #[instrument(skip(self, shipping_address), fields(user_id = %user_id, order_id), err)]
    pub async fn place_order(
        &self,
        user_id: UserId,
        shipping_address: &str,
    ) -> Result<Order, EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = materialize(tx.as_mut(), user_id, shipping_address).await;
        let order = finish(tx, outcome).await?;

        Span::current().record("order_id", tracing::field::display(order.id));
        info!(total = %order.total_amount, lines = order.items.len(), "order placed");

        // The committed order is authoritative; a failed re-read only costs
        // the caller the stored timestamps.
        match self.reload(order.id, user_id).await {
            Ok(Some(stored)) => Ok(stored),
            Ok(None) => {
                warn!("placed order not visible on re-read");
                Ok(order)
            }
            Err(err) => {
                warn!(error = %err, "re-reading placed order failed");
                Ok(order)
            }
        }
    }

    async fn reload(&self, order_id: OrderId, user_id: UserId) -> Result<Option<Order>, EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.order(order_id, Some(user_id)).await.map_err(EngineError::from);
        finish(tx, outcome).await
    }
}

async fn materialize(
    tx: &mut dyn StoreTx,
    user_id: UserId,
    shipping_address: &str,
) -> Result<Order, EngineError> {
    let snapshot = cart_snapshot::take(tx, user_id).await?;
    if snapshot.is_empty() {
        return Err(EngineError::EmptyCart);
    }

    let order = Order::place(OrderId::new(), &snapshot, shipping_address, Utc::now())?;
    tx.insert_order(&order).await?;

    // Product rows are locked in id order.
    let mut reservations: Vec<_> = order.items.iter().map(|i| (i.product_id, i.quantity)).collect();
    reservations.sort_unstable_by_key(|(product_id, _)| *product_id);
    for (product_id, quantity) in reservations {
        inventory_ledger::reserve(tx, product_id, quantity).await?;
    }

    let cleared = tx.clear_cart(user_id).await?;
    debug!(cleared, "cart cleared");

    Ok(order)
}
