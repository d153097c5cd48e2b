use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use spectr_core::{Entity, Money, OrderId, PaymentId};
use spectr_orders::{Order, OrderStatus, PaymentStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("order {0} is already paid")]
    AlreadyPaid(OrderId),

    #[error("order {0} is cancelled")]
    OrderCancelled(OrderId),

    #[error("payment amount {found} does not match order total {expected}")]
    AmountMismatch { expected: Money, found: Money },

    #[error("payment {payment_id} does not belong to order {order_id}")]
    OrderMismatch { payment_id: PaymentId, order_id: OrderId },
}

/// A payment attempt against one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub amount: Money,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What confirming a payment should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Already completed: report success, apply nothing.
    AlreadyCompleted,
    /// Flip payment and order to completed and record the sale.
    Complete { amount: Money, lines: u64 },
}

impl Payment {
    /// Open a pending payment for the order's current total.
    pub fn for_order(order: &Order, now: DateTime<Utc>) -> Result<Self, PaymentError> {
        if order.is_paid() {
            return Err(PaymentError::AlreadyPaid(order.id));
        }
        if order.status == OrderStatus::Cancelled {
            return Err(PaymentError::OrderCancelled(order.id));
        }

        Ok(Self {
            id: PaymentId::new(),
            order_id: order.id,
            amount: order.total_amount,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.payment_status == PaymentStatus::Completed
    }

    /// Decide the outcome of a confirm call against the owning order.
    pub fn confirm_against(&self, order: &Order) -> Result<Confirmation, PaymentError> {
        if self.is_completed() {
            return Ok(Confirmation::AlreadyCompleted);
        }
        if order.id != self.order_id {
            return Err(PaymentError::OrderMismatch {
                payment_id: self.id,
                order_id: order.id,
            });
        }
        if order.status == OrderStatus::Cancelled {
            return Err(PaymentError::OrderCancelled(order.id));
        }
        if order.total_amount != self.amount {
            return Err(PaymentError::AmountMismatch {
                expected: order.total_amount,
                found: self.amount,
            });
        }
        if order.is_paid() {
            return Err(PaymentError::AlreadyPaid(order.id));
        }

        Ok(Confirmation::Complete {
            amount: self.amount,
            lines: order.items.len() as u64,
        })
    }
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
