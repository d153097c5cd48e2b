use chrono::Utc;
use tracing::{info, instrument};

use spectr_core::{OrderId, UserId};
use spectr_infra::{CommerceStore, StoreTx};
use spectr_orders::{Order, OrderStatus, StatusChange};

use crate::tx::finish;
use crate::{inventory_ledger, EngineError, Resource};

/// Reads and state changes of placed orders.
///
/// `owner` is the ownership restriction: `Some(user)` only ever matches that
/// user's orders, `None` matches any live order.
#[derive(Debug, Clone)]
pub struct OrderLifecycle<S> {
    store: S,
}

impl<S: CommerceStore> OrderLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, order_id: OrderId, owner: Option<UserId>) -> Result<Order, EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = load(tx.as_mut(), order_id, owner).await;
        finish(tx, outcome).await
    }

    /// Live orders, newest first.
    #[instrument(skip(self), err)]
    pub async fn list(&self, owner: Option<UserId>) -> Result<Vec<Order>, EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.orders(owner).await.map_err(EngineError::from);
        finish(tx, outcome).await
    }

    /// Cancel a pending order and hand its stock back.
    ///
    /// The status flip is conditional on `pending`, so of two concurrent
    /// cancellations only one restocks.
    #[instrument(skip(self), err)]
    pub async fn cancel(&self, order_id: OrderId, owner: Option<UserId>) -> Result<Order, EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = cancel_in(tx.as_mut(), order_id, owner).await;
        let order = finish(tx, outcome).await?;
        info!(%order_id, "order cancelled");
        Ok(order)
    }

    /// Move an order along the status lattice (admin operation).
    ///
    /// Setting the current status again succeeds without side effects.
    #[instrument(skip(self), err)]
    pub async fn set_status(
        &self,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<Order, EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = set_status_in(tx.as_mut(), order_id, target).await;
        finish(tx, outcome).await
    }

    /// Soft-delete a cancelled or delivered order. Stock is not touched.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, order_id: OrderId, owner: Option<UserId>) -> Result<(), EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = delete_in(tx.as_mut(), order_id, owner).await;
        finish(tx, outcome).await?;
        info!(%order_id, "order deleted");
        Ok(())
    }
}

async fn load(
    tx: &mut dyn StoreTx,
    order_id: OrderId,
    owner: Option<UserId>,
) -> Result<Order, EngineError> {
    tx.order(order_id, owner)
        .await?
        .ok_or(EngineError::not_found(Resource::Order))
}

/// Status of an order whose conditional update just matched nothing.
async fn current_status(
    tx: &mut dyn StoreTx,
    order_id: OrderId,
    owner: Option<UserId>,
) -> Result<OrderStatus, EngineError> {
    Ok(load(tx, order_id, owner).await?.status)
}

async fn restock(tx: &mut dyn StoreTx, order: &Order) -> Result<(), EngineError> {
    for (product_id, quantity) in order.restock_lines() {
        inventory_ledger::release(tx, product_id, quantity).await?;
    }
    Ok(())
}

async fn cancel_in(
    tx: &mut dyn StoreTx,
    order_id: OrderId,
    owner: Option<UserId>,
) -> Result<Order, EngineError> {
    let mut order = load(tx, order_id, owner).await?;
    order.ensure_pending()?;

    if !tx
        .transition_order_status(order_id, OrderStatus::Pending, OrderStatus::Cancelled)
        .await?
    {
        let status = current_status(tx, order_id, owner).await?;
        return Err(EngineError::NotPending { order_id, status });
    }

    restock(tx, &order).await?;
    order.status = OrderStatus::Cancelled;
    order.updated_at = Utc::now();
    Ok(order)
}

async fn set_status_in(
    tx: &mut dyn StoreTx,
    order_id: OrderId,
    target: OrderStatus,
) -> Result<Order, EngineError> {
    let mut order = load(tx, order_id, None).await?;
    let from = order.status;

    match order.transition_to(target, Utc::now())? {
        StatusChange::Unchanged => Ok(order),
        StatusChange::Apply { to, restock: needs_restock } => {
            if !tx.transition_order_status(order_id, from, to).await? {
                let from = current_status(tx, order_id, None).await?;
                // Another caller may have applied the same target first.
                if from == to {
                    return Ok(order);
                }
                return Err(EngineError::InvalidTransition { from, to });
            }
            if needs_restock {
                restock(tx, &order).await?;
            }
            info!(%order_id, %from, %to, "order status changed");
            Ok(order)
        }
    }
}

async fn delete_in(
    tx: &mut dyn StoreTx,
    order_id: OrderId,
    owner: Option<UserId>,
) -> Result<(), EngineError> {
    let order = load(tx, order_id, owner).await?;
    order.ensure_deletable()?;

    if !tx.soft_delete_order(order_id).await? {
        return Err(EngineError::not_found(Resource::Order));
    }
    Ok(())
}
