use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spectr_cart::CartSnapshot;
use spectr_core::{DomainError, Entity, Money, OrderId, OrderItemId, ProductId, UserId};

use crate::{OrderError, OrderStatus, PaymentStatus, StatusChange};

/// A purchased line. Price and quantity are frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Money,
    pub shipping_address: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Materialize a cart snapshot into a pending, unpaid order.
    ///
    /// Item prices are pinned to the snapshot's unit prices and the order
    /// total is the sum of the line totals.
    pub fn place(
        id: OrderId,
        snapshot: &CartSnapshot,
        shipping_address: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if snapshot.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(DomainError::validation("shipping address is required").into());
        }

        let items = snapshot
            .lines()
            .iter()
            .map(|line| {
                if line.quantity <= 0 {
                    return Err(DomainError::validation(format!(
                        "cart line for product {} has non-positive quantity",
                        line.product_id
                    )));
                }
                Ok(OrderItem {
                    id: OrderItemId::new(),
                    order_id: id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    total_price: line.unit_price.times(line.quantity)?,
                    created_at: now,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let total_amount = Money::sum(items.iter().map(|i| i.total_price))?;

        Ok(Self {
            id,
            user_id: snapshot.user_id,
            total_amount,
            shipping_address: shipping_address.to_string(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            items,
        })
    }

    /// `total_amount == Σ item.total_price`.
    pub fn totals_consistent(&self) -> bool {
        Money::sum(self.items.iter().map(|i| i.total_price))
            .map(|sum| sum == self.total_amount)
            .unwrap_or(false)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Completed
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn ensure_pending(&self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderError::NotPending {
                order_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    pub fn ensure_deletable(&self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Pending {
            return Err(OrderError::PendingNotDeletable(self.id));
        }
        Ok(())
    }

    /// Plan a move to `target` and, when legal, apply it to this copy.
    pub fn transition_to(
        &mut self,
        target: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, OrderError> {
        let change = self.status.plan_transition(target)?;
        if let StatusChange::Apply { to, .. } = change {
            self.status = to;
            self.updated_at = now;
        }
        Ok(change)
    }

    /// `(product, quantity)` pairs to hand back to inventory on cancellation.
    pub fn restock_lines(&self) -> impl Iterator<Item = (ProductId, i64)> + '_ {
        self.items.iter().map(|i| (i.product_id, i.quantity))
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use spectr_cart::CartLine;

    fn test_user_id() -> UserId {
        UserId::new()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn line(qty: i64, price: i64) -> CartLine {
        CartLine::new(ProductId::new(), qty, Money::from_minor(price)).unwrap()
    }

    fn test_order() -> Order {
        let snapshot = CartSnapshot::new(test_user_id(), vec![line(2, 100), line(1, 50)]);
        Order::place(OrderId::new(), &snapshot, "1 Main St", test_time()).unwrap()
    }

    #[test]
    fn place_pins_prices_and_sums_total() {
        let user = test_user_id();
        let p1 = ProductId::new();
        let snapshot = CartSnapshot::new(
            user,
            vec![CartLine::new(p1, 3, Money::from_minor(10)).unwrap()],
        );
        let order_id = OrderId::new();

        let order = Order::place(order_id, &snapshot, "addr", test_time()).unwrap();

        assert_eq!(order.user_id, user);
        assert_eq!(order.total_amount, Money::from_minor(30));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.items.len(), 1);

        let item = &order.items[0];
        assert_eq!(item.order_id, order_id);
        assert_eq!(item.product_id, p1);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.unit_price, Money::from_minor(10));
        assert_eq!(item.total_price, Money::from_minor(30));
    }

    #[test]
    fn place_rejects_empty_cart() {
        let snapshot = CartSnapshot::new(test_user_id(), vec![]);
        let err = Order::place(OrderId::new(), &snapshot, "addr", test_time()).unwrap_err();
        assert_eq!(err, OrderError::EmptyCart);
    }

    #[test]
    fn place_rejects_blank_address() {
        let snapshot = CartSnapshot::new(test_user_id(), vec![line(1, 10)]);
        match Order::place(OrderId::new(), &snapshot, "   ", test_time()) {
            Err(OrderError::Domain(DomainError::Validation(msg))) => assert!(msg.contains("address")),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn pending_order_cannot_be_deleted() {
        let mut order = test_order();
        assert_eq!(order.ensure_deletable(), Err(OrderError::PendingNotDeletable(order.id)));

        order.transition_to(OrderStatus::Delivered, test_time()).unwrap();
        assert!(order.ensure_deletable().is_ok());
    }

    #[test]
    fn cancelled_order_is_no_longer_pending() {
        let mut order = test_order();
        let change = order.transition_to(OrderStatus::Cancelled, test_time()).unwrap();
        assert_eq!(change, StatusChange::Apply { to: OrderStatus::Cancelled, restock: true });

        match order.ensure_pending() {
            Err(OrderError::NotPending { status, .. }) => assert_eq!(status, OrderStatus::Cancelled),
            other => panic!("Expected NotPending, got {other:?}"),
        }
    }

    #[test]
    fn failed_transition_leaves_status_alone() {
        let mut order = test_order();
        order.transition_to(OrderStatus::Delivered, test_time()).unwrap();

        assert!(order.transition_to(OrderStatus::Cancelled, test_time()).is_err());
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[test]
    fn restock_lines_mirror_items() {
        let order = test_order();
        let lines: Vec<_> = order.restock_lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].1, 2);
        assert_eq!(lines[1].1, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Order total equals the sum of item totals, and every item keeps its cart price.
        #[test]
        fn order_total_is_sum_of_item_totals(
            lines in prop::collection::vec((1i64..50, 0i64..100_000), 1..20)
        ) {
            let cart: Vec<CartLine> = lines.iter().map(|(q, p)| line(*q, *p)).collect();
            let snapshot = CartSnapshot::new(test_user_id(), cart.clone());

            let order = Order::place(OrderId::new(), &snapshot, "addr", test_time()).unwrap();

            prop_assert!(order.totals_consistent());
            prop_assert_eq!(order.items.len(), cart.len());
            for (item, cart_line) in order.items.iter().zip(cart.iter()) {
                prop_assert_eq!(item.unit_price, cart_line.unit_price);
                prop_assert_eq!(item.quantity, cart_line.quantity);
                prop_assert_eq!(item.total_price, cart_line.line_total);
            }
        }
    }
}
