use thiserror::Error;

use spectr_core::{DomainError, OrderId};

use crate::OrderStatus;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("order {order_id} is not pending (status: {status})")]
    NotPending { order_id: OrderId, status: OrderStatus },

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order {0} is still pending; cancel or deliver it before deleting")]
    PendingNotDeletable(OrderId),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
