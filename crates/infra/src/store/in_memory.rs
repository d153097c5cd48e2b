use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use spectr_cart::CartItem;
use spectr_core::{OrderId, PaymentId, ProductId, UserId};
use spectr_inventory::Product;
use spectr_orders::{Order, OrderStatus, PaymentStatus};
use spectr_payments::Payment;
use spectr_stats::{AppStats, StatsDelta};

use super::r#trait::{CommerceStore, StoreError, StoreTx};

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    /// Insertion order is cart order.
    cart: Vec<CartItem>,
    orders: HashMap<OrderId, Order>,
    payments: HashMap<PaymentId, Payment>,
    stats: AppStats,
}

/// In-memory commerce store.
///
/// Intended for tests/dev. Transactions run one at a time: each holds the
/// state lock, works on a private copy, and publishes the copy on commit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommerceStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTx { guard, working }))
    }
}

struct InMemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
}

impl InMemoryTx {
    fn live_order_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.working.orders.get_mut(&id).filter(|o| !o.is_deleted())
    }
}

fn visible_to(order: &Order, owner: Option<UserId>) -> bool {
    !order.is_deleted() && owner.is_none_or(|user_id| order.user_id == user_id)
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn insert_product(&mut self, product: &Product) -> Result<(), StoreError> {
        if self.working.products.contains_key(&product.id) {
            return Err(StoreError::Conflict(format!("product {} already exists", product.id)));
        }
        self.working.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn soft_delete_product(&mut self, id: ProductId) -> Result<bool, StoreError> {
        match self.working.products.get_mut(&id) {
            Some(product) if !product.is_deleted() => {
                product.soft_delete(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn upsert_cart_item(&mut self, item: &CartItem) -> Result<CartItem, StoreError> {
        if !self.working.products.contains_key(&item.product_id) {
            return Err(StoreError::Constraint(format!(
                "cart item references unknown product {}",
                item.product_id
            )));
        }

        let existing = self
            .working
            .cart
            .iter_mut()
            .find(|c| c.user_id == item.user_id && c.product_id == item.product_id);

        let stored = match existing {
            Some(row) => {
                row.quantity = item.quantity;
                row.unit_price = item.unit_price;
                row.total_price = item.total_price;
                row.updated_at = item.updated_at;
                row.clone()
            }
            None => {
                self.working.cart.push(item.clone());
                item.clone()
            }
        };
        Ok(stored)
    }

    async fn cart_items(&mut self, user_id: UserId) -> Result<Vec<CartItem>, StoreError> {
        Ok(self
            .working
            .cart
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn clear_cart(&mut self, user_id: UserId) -> Result<u64, StoreError> {
        let before = self.working.cart.len();
        self.working.cart.retain(|c| c.user_id != user_id);
        Ok((before - self.working.cart.len()) as u64)
    }

    async fn reserve_stock(&mut self, product_id: ProductId, quantity: i64) -> Result<bool, StoreError> {
        match self.working.products.get_mut(&product_id) {
            Some(product) => Ok(product.reserve(quantity, Utc::now()).is_ok()),
            None => Ok(false),
        }
    }

    async fn release_stock(&mut self, product_id: ProductId, quantity: i64) -> Result<u64, StoreError> {
        match self.working.products.get_mut(&product_id) {
            Some(product) => {
                product
                    .release(quantity, Utc::now())
                    .map_err(|e| StoreError::Constraint(e.to_string()))?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        if self.working.orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id)));
        }
        if let Some(item) = order
            .items
            .iter()
            .find(|i| !self.working.products.contains_key(&i.product_id))
        {
            return Err(StoreError::Constraint(format!(
                "order item references unknown product {}",
                item.product_id
            )));
        }
        self.working.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn order(&mut self, id: OrderId, owner: Option<UserId>) -> Result<Option<Order>, StoreError> {
        Ok(self
            .working
            .orders
            .get(&id)
            .filter(|o| visible_to(o, owner))
            .cloned())
    }

    async fn orders(&mut self, owner: Option<UserId>) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .working
            .orders
            .values()
            .filter(|o| visible_to(o, owner))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn transition_order_status(
        &mut self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StoreError> {
        match self.live_order_mut(id) {
            Some(order) if order.status == from => {
                order.status = to;
                order.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_order_paid(&mut self, id: OrderId) -> Result<bool, StoreError> {
        match self.live_order_mut(id) {
            Some(order)
                if order.payment_status == PaymentStatus::Pending
                    && order.status != OrderStatus::Cancelled =>
            {
                order.payment_status = PaymentStatus::Completed;
                order.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete_order(&mut self, id: OrderId) -> Result<bool, StoreError> {
        match self.live_order_mut(id) {
            Some(order) if order.status != OrderStatus::Pending => {
                let now = Utc::now();
                order.deleted_at = Some(now);
                order.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        if self.working.payments.contains_key(&payment.id) {
            return Err(StoreError::Conflict(format!("payment {} already exists", payment.id)));
        }
        if !self.working.orders.contains_key(&payment.order_id) {
            return Err(StoreError::Constraint(format!(
                "payment references unknown order {}",
                payment.order_id
            )));
        }
        self.working.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn payment(&mut self, id: PaymentId, owner: Option<UserId>) -> Result<Option<Payment>, StoreError> {
        let orders = &self.working.orders;
        Ok(self
            .working
            .payments
            .get(&id)
            .filter(|p| {
                owner.is_none_or(|user_id| orders.get(&p.order_id).is_some_and(|o| o.user_id == user_id))
            })
            .cloned())
    }

    async fn complete_payment(&mut self, id: PaymentId) -> Result<bool, StoreError> {
        match self.working.payments.get_mut(&id) {
            Some(payment) if payment.payment_status == PaymentStatus::Pending => {
                payment.payment_status = PaymentStatus::Completed;
                payment.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_stats(&mut self, delta: &StatsDelta) -> Result<(), StoreError> {
        self.working.stats.apply(delta);
        Ok(())
    }

    async fn stats(&mut self) -> Result<AppStats, StoreError> {
        Ok(self.working.stats)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
