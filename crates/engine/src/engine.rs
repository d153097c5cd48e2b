//! Actor-facing entry point.
//!
//! Every call authorizes the actor first, then narrows record lookups to the
//! actor's own rows unless the actor is an admin.

use tracing::instrument;

use spectr_auth::{authorize, Actor, Permission};
use spectr_cart::CartSnapshot;
use spectr_core::{OrderId, PaymentId};
use spectr_infra::CommerceStore;
use spectr_orders::{Order, OrderStatus};
use spectr_payments::Payment;
use spectr_stats::AppStats;

use crate::tx::finish;
use crate::{
    cart_snapshot, ConfirmOutcome, EngineError, OrderLifecycle, OrderMaterializer, PaymentLedger,
    StatsAggregator,
};

#[derive(Debug, Clone)]
pub struct CheckoutEngine<S> {
    store: S,
    materializer: OrderMaterializer<S>,
    lifecycle: OrderLifecycle<S>,
    payments: PaymentLedger<S>,
    stats: StatsAggregator<S>,
}

impl<S> CheckoutEngine<S>
where
    S: CommerceStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            materializer: OrderMaterializer::new(store.clone()),
            lifecycle: OrderLifecycle::new(store.clone()),
            payments: PaymentLedger::new(store.clone()),
            stats: StatsAggregator::new(store.clone()),
            store,
        }
    }

    /// The underlying store, for collaborators that own catalog and cart writes.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stats_aggregator(&self) -> &StatsAggregator<S> {
        &self.stats
    }

    /// The actor's own cart, as checkout would see it.
    #[instrument(skip(self), fields(user_id = %actor.user_id), err)]
    pub async fn cart(&self, actor: &Actor) -> Result<CartSnapshot, EngineError> {
        authorize(actor, &Permission::ORDERS_PLACE)?;
        let mut tx = self.store.begin().await?;
        let outcome = cart_snapshot::take(tx.as_mut(), actor.user_id).await;
        finish(tx, outcome).await
    }

    pub async fn place_order(&self, actor: &Actor, shipping_address: &str) -> Result<Order, EngineError> {
        authorize(actor, &Permission::ORDERS_PLACE)?;
        self.materializer
            .place_order(actor.user_id, shipping_address)
            .await
    }

    pub async fn get_order(&self, actor: &Actor, order_id: OrderId) -> Result<Order, EngineError> {
        authorize(actor, &Permission::ORDERS_READ)?;
        self.lifecycle.get(order_id, actor.owner_scope()).await
    }

    pub async fn list_orders(&self, actor: &Actor) -> Result<Vec<Order>, EngineError> {
        authorize(actor, &Permission::ORDERS_READ)?;
        self.lifecycle.list(actor.owner_scope()).await
    }

    pub async fn cancel_order(&self, actor: &Actor, order_id: OrderId) -> Result<Order, EngineError> {
        authorize(actor, &Permission::ORDERS_CANCEL)?;
        self.lifecycle.cancel(order_id, actor.owner_scope()).await
    }

    pub async fn set_order_status(
        &self,
        actor: &Actor,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, EngineError> {
        authorize(actor, &Permission::ORDERS_SET_STATUS)?;
        self.lifecycle.set_status(order_id, status).await
    }

    pub async fn delete_order(&self, actor: &Actor, order_id: OrderId) -> Result<(), EngineError> {
        authorize(actor, &Permission::ORDERS_DELETE)?;
        self.lifecycle.delete(order_id, actor.owner_scope()).await
    }

    pub async fn create_payment(&self, actor: &Actor, order_id: OrderId) -> Result<Payment, EngineError> {
        authorize(actor, &Permission::PAYMENTS_CREATE)?;
        self.payments.create(order_id, actor.owner_scope()).await
    }

    pub async fn confirm_payment(
        &self,
        actor: &Actor,
        payment_id: PaymentId,
    ) -> Result<ConfirmOutcome, EngineError> {
        authorize(actor, &Permission::PAYMENTS_CONFIRM)?;
        self.payments.confirm(payment_id, actor.owner_scope()).await
    }

    /// Called by the signup flow once an account exists.
    pub async fn record_signup(&self) -> Result<(), EngineError> {
        self.stats.record_signup().await
    }

    pub async fn stats(&self, actor: &Actor) -> Result<AppStats, EngineError> {
        authorize(actor, &Permission::STATS_READ)?;
        self.stats.snapshot().await
    }
}
