use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use spectr_cart::CartItem;
use spectr_core::{OrderId, PaymentId, ProductId, UserId};
use spectr_inventory::Product;
use spectr_orders::{Order, OrderStatus};
use spectr_payments::Payment;
use spectr_stats::{AppStats, StatsDelta};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another transaction won (unique violation, serialization failure, deadlock).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A foreign key or check constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A stored row could not be decoded into a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// The backend could not be reached (pool closed, timeout, IO).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage error: {0}")]
    Backend(String),
}

/// Opens transactions against the commerce tables.
#[async_trait]
pub trait CommerceStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;
}

#[async_trait]
impl<S> CommerceStore for Arc<S>
where
    S: CommerceStore + ?Sized,
{
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        (**self).begin().await
    }
}

/// One open transaction.
///
/// Methods returning `bool` are conditional updates: `true` means exactly the
/// targeted row matched the condition and was changed. Callers use them as
/// serialization points instead of reading and then writing.
#[async_trait]
pub trait StoreTx: Send {
    // catalog (owned by product management; used for seeding)

    async fn insert_product(&mut self, product: &Product) -> Result<(), StoreError>;

    /// Includes soft-deleted products.
    async fn product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn soft_delete_product(&mut self, id: ProductId) -> Result<bool, StoreError>;

    // cart

    /// Insert or replace the (user, product) row; returns the stored row.
    async fn upsert_cart_item(&mut self, item: &CartItem) -> Result<CartItem, StoreError>;

    /// The user's cart rows in the order they were added.
    async fn cart_items(&mut self, user_id: UserId) -> Result<Vec<CartItem>, StoreError>;

    async fn clear_cart(&mut self, user_id: UserId) -> Result<u64, StoreError>;

    // stock

    /// Decrement stock only if the product is live and has `quantity` units.
    async fn reserve_stock(&mut self, product_id: ProductId, quantity: i64) -> Result<bool, StoreError>;

    /// Increment stock by `quantity`; returns rows affected.
    async fn release_stock(&mut self, product_id: ProductId, quantity: i64) -> Result<u64, StoreError>;

    // orders

    /// Insert the order row and all of its items.
    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError>;

    /// Load a live order with items. `owner` restricts the lookup to that user.
    async fn order(&mut self, id: OrderId, owner: Option<UserId>) -> Result<Option<Order>, StoreError>;

    /// Live orders with items, newest first.
    async fn orders(&mut self, owner: Option<UserId>) -> Result<Vec<Order>, StoreError>;

    /// Set `status = to` where the current status is `from`.
    async fn transition_order_status(
        &mut self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StoreError>;

    /// Set `payment_status = completed` on a live, non-cancelled order that is
    /// still pending payment.
    async fn mark_order_paid(&mut self, id: OrderId) -> Result<bool, StoreError>;

    /// Tombstone a non-pending, live order.
    async fn soft_delete_order(&mut self, id: OrderId) -> Result<bool, StoreError>;

    // payments

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError>;

    /// `owner` restricts the lookup to payments whose order belongs to that
    /// user. The order may be soft-deleted.
    async fn payment(&mut self, id: PaymentId, owner: Option<UserId>) -> Result<Option<Payment>, StoreError>;

    /// Set `payment_status = completed` where it is still pending.
    async fn complete_payment(&mut self, id: PaymentId) -> Result<bool, StoreError>;

    // stats

    /// Additive update of the singleton row.
    async fn increment_stats(&mut self, delta: &StatsDelta) -> Result<(), StoreError>;

    async fn stats(&mut self) -> Result<AppStats, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
