use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use spectr_cart::CartItem;
use spectr_core::{OrderId, PaymentId, ProductId, UserId};
use spectr_infra::{CommerceStore, InMemoryStore, StoreError, StoreTx};
use spectr_inventory::Product;
use spectr_orders::{Order, OrderStatus};
use spectr_payments::Payment;
use spectr_stats::{AppStats, StatsDelta};

/// A competing writer that commits between the engine's read and its
/// conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rival {
    /// Confirms the payment right before `complete_payment`.
    Confirms,
    /// Moves the order to the given status right before `transition_order_status`.
    SetsStatus(OrderStatus),
    /// Cancels the order right before `mark_order_paid`.
    CancelsBeforePayment,
}

#[derive(Debug, Clone, Copy)]
enum Move {
    Confirm(PaymentId),
    Status(OrderId, OrderStatus),
}

/// Wraps an [`InMemoryStore`] and lets one [`Rival`] win a race.
///
/// The rival's writes land in the working copy just before the engine's
/// conditional update runs. If the engine then rolls back, they are replayed
/// in a fresh transaction so the result matches a rival that committed first.
/// Every `reserve_stock` call is recorded.
#[derive(Clone)]
pub struct RacingStore {
    inner: InMemoryStore,
    rival: Arc<Mutex<Option<Rival>>>,
    reservations: Arc<Mutex<Vec<ProductId>>>,
}

impl RacingStore {
    pub fn new(inner: InMemoryStore, rival: Option<Rival>) -> Self {
        Self {
            inner,
            rival: Arc::new(Mutex::new(rival)),
            reservations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn reservations(&self) -> Vec<ProductId> {
        self.reservations.lock().unwrap().clone()
    }

    /// Whether the rival has already moved.
    pub fn rival_moved(&self) -> bool {
        self.rival.lock().unwrap().is_none()
    }
}

#[async_trait]
impl CommerceStore for RacingStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        Ok(Box::new(RacingTx {
            inner: self.inner.begin().await?,
            store: self.inner.clone(),
            rival: self.rival.clone(),
            reservations: self.reservations.clone(),
            moved: None,
        }))
    }
}

struct RacingTx {
    inner: Box<dyn StoreTx>,
    store: InMemoryStore,
    rival: Arc<Mutex<Option<Rival>>>,
    reservations: Arc<Mutex<Vec<ProductId>>>,
    moved: Option<Move>,
}

impl RacingTx {
    async fn race(&mut self, trigger: Rival, mv: Move) -> Result<(), StoreError> {
        let fires = {
            let mut slot = self.rival.lock().unwrap();
            let matches = match (*slot, trigger) {
                (Some(Rival::SetsStatus(_)), Rival::SetsStatus(_)) => true,
                (Some(rival), trigger) => rival == trigger,
                (None, _) => false,
            };
            if matches { slot.take() } else { None }
        };
        let Some(rival) = fires else { return Ok(()) };

        let mv = match (rival, mv) {
            (Rival::SetsStatus(to), Move::Status(id, _)) => Move::Status(id, to),
            (_, mv) => mv,
        };
        apply(self.inner.as_mut(), mv).await?;
        self.moved = Some(mv);
        Ok(())
    }
}

async fn apply(tx: &mut dyn StoreTx, mv: Move) -> Result<(), StoreError> {
    match mv {
        Move::Confirm(payment_id) => {
            let Some(payment) = tx.payment(payment_id, None).await? else { return Ok(()) };
            let Some(order) = tx.order(payment.order_id, None).await? else { return Ok(()) };
            tx.complete_payment(payment_id).await?;
            tx.mark_order_paid(order.id).await?;
            tx.increment_stats(&StatsDelta::sale(order.items.len() as u64, payment.amount))
                .await?;
        }
        Move::Status(order_id, to) => {
            let Some(order) = tx.order(order_id, None).await? else { return Ok(()) };
            if tx.transition_order_status(order_id, order.status, to).await?
                && to == OrderStatus::Cancelled
            {
                for (product_id, quantity) in order.restock_lines() {
                    tx.release_stock(product_id, quantity).await?;
                }
            }
        }
    }
    Ok(())
}

#[async_trait]
impl StoreTx for RacingTx {
    async fn insert_product(&mut self, product: &Product) -> Result<(), StoreError> {
        self.inner.insert_product(product).await
    }

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.inner.product(id).await
    }

    async fn soft_delete_product(&mut self, id: ProductId) -> Result<bool, StoreError> {
        self.inner.soft_delete_product(id).await
    }

    async fn upsert_cart_item(&mut self, item: &CartItem) -> Result<CartItem, StoreError> {
        self.inner.upsert_cart_item(item).await
    }

    async fn cart_items(&mut self, user_id: UserId) -> Result<Vec<CartItem>, StoreError> {
        self.inner.cart_items(user_id).await
    }

    async fn clear_cart(&mut self, user_id: UserId) -> Result<u64, StoreError> {
        self.inner.clear_cart(user_id).await
    }

    async fn reserve_stock(&mut self, product_id: ProductId, quantity: i64) -> Result<bool, StoreError> {
        self.reservations.lock().unwrap().push(product_id);
        self.inner.reserve_stock(product_id, quantity).await
    }

    async fn release_stock(&mut self, product_id: ProductId, quantity: i64) -> Result<u64, StoreError> {
        self.inner.release_stock(product_id, quantity).await
    }

    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        self.inner.insert_order(order).await
    }

    async fn order(&mut self, id: OrderId, owner: Option<UserId>) -> Result<Option<Order>, StoreError> {
        self.inner.order(id, owner).await
    }

    async fn orders(&mut self, owner: Option<UserId>) -> Result<Vec<Order>, StoreError> {
        self.inner.orders(owner).await
    }

    async fn transition_order_status(
        &mut self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StoreError> {
        self.race(Rival::SetsStatus(to), Move::Status(id, to)).await?;
        self.inner.transition_order_status(id, from, to).await
    }

    async fn mark_order_paid(&mut self, id: OrderId) -> Result<bool, StoreError> {
        self.race(Rival::CancelsBeforePayment, Move::Status(id, OrderStatus::Cancelled))
            .await?;
        self.inner.mark_order_paid(id).await
    }

    async fn soft_delete_order(&mut self, id: OrderId) -> Result<bool, StoreError> {
        self.inner.soft_delete_order(id).await
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        self.inner.insert_payment(payment).await
    }

    async fn payment(&mut self, id: PaymentId, owner: Option<UserId>) -> Result<Option<Payment>, StoreError> {
        self.inner.payment(id, owner).await
    }

    async fn complete_payment(&mut self, id: PaymentId) -> Result<bool, StoreError> {
        self.race(Rival::Confirms, Move::Confirm(id)).await?;
        self.inner.complete_payment(id).await
    }

    async fn increment_stats(&mut self, delta: &StatsDelta) -> Result<(), StoreError> {
        self.inner.increment_stats(delta).await
    }

    async fn stats(&mut self) -> Result<AppStats, StoreError> {
        self.inner.stats().await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let RacingTx { inner, store, moved, .. } = *self;
        inner.rollback().await?;
        if let Some(mv) = moved {
            let mut tx = store.begin().await?;
            apply(tx.as_mut(), mv).await?;
            tx.commit().await?;
        }
        Ok(())
    }
}
