//! Engine error model: every failure a caller can observe.

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use spectr_auth::AuthzError;
use spectr_core::{DomainError, Money, OrderId, ProductId};
use spectr_infra::StoreError;
use spectr_orders::{OrderError, OrderStatus};
use spectr_payments::PaymentError;

/// Kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Order,
    Payment,
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Resource::Order => "order",
            Resource::Payment => "payment",
        })
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("product {product_id} does not have enough stock")]
    InsufficientStock { product_id: ProductId },

    #[error("{entity} not found")]
    NotFound { entity: Resource },

    #[error("order {order_id} is not pending (status: {status})")]
    NotPending { order_id: OrderId, status: OrderStatus },

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order {0} is still pending; cancel or deliver it before deleting")]
    PendingNotDeletable(OrderId),

    #[error("payment amount {found} does not match order total {expected}")]
    AmountMismatch { expected: Money, found: Money },

    #[error("order {0} is already paid")]
    AlreadyPaid(OrderId),

    #[error("order {0} is cancelled")]
    OrderCancelled(OrderId),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Transaction or IO failure; nothing from the failed call was applied.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl EngineError {
    pub fn not_found(entity: Resource) -> Self {
        Self::NotFound { entity }
    }

    /// Stable, machine-readable code for each failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::EmptyCart => "empty_cart",
            EngineError::InsufficientStock { .. } => "insufficient_stock",
            EngineError::NotFound { .. } => "not_found",
            EngineError::NotPending { .. } => "not_pending",
            EngineError::InvalidTransition { .. } => "invalid_transition",
            EngineError::PendingNotDeletable(_) => "pending_not_deletable",
            EngineError::AmountMismatch { .. } => "amount_mismatch",
            EngineError::AlreadyPaid(_) => "already_paid",
            EngineError::OrderCancelled(_) => "order_cancelled",
            EngineError::Validation(_) => "validation_error",
            EngineError::Forbidden(_) => "forbidden",
            EngineError::Storage(_) => "storage_error",
        }
    }

    /// Whether retrying the whole call from scratch may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Storage(
                StoreError::Conflict(_) | StoreError::Unavailable(_) | StoreError::Backend(_)
            )
        )
    }

    /// Transport-neutral error envelope.
    ///
    /// Storage details stay in the logs; callers only learn that storage failed.
    pub fn to_body(&self) -> JsonValue {
        let message = match self {
            EngineError::Storage(_) => "storage failure".to_string(),
            other => other.to_string(),
        };
        json!({
            "error": self.code(),
            "message": message,
            "retryable": self.is_retryable(),
        })
    }
}

impl From<DomainError> for EngineError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => EngineError::Validation(msg),
        }
    }
}

impl From<OrderError> for EngineError {
    fn from(value: OrderError) -> Self {
        match value {
            OrderError::EmptyCart => EngineError::EmptyCart,
            OrderError::NotPending { order_id, status } => EngineError::NotPending { order_id, status },
            OrderError::InvalidTransition { from, to } => EngineError::InvalidTransition { from, to },
            OrderError::PendingNotDeletable(id) => EngineError::PendingNotDeletable(id),
            OrderError::Domain(err) => err.into(),
        }
    }
}

impl From<PaymentError> for EngineError {
    fn from(value: PaymentError) -> Self {
        match value {
            PaymentError::AlreadyPaid(id) => EngineError::AlreadyPaid(id),
            PaymentError::OrderCancelled(id) => EngineError::OrderCancelled(id),
            PaymentError::AmountMismatch { expected, found } => {
                EngineError::AmountMismatch { expected, found }
            }
            err @ PaymentError::OrderMismatch { .. } => {
                EngineError::Storage(StoreError::Corrupt(err.to_string()))
            }
        }
    }
}

impl From<AuthzError> for EngineError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Forbidden(permission) => {
                EngineError::Forbidden(format!("missing permission '{permission}'"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_storage_failures_are_retryable() {
        assert!(EngineError::Storage(StoreError::Unavailable("down".into())).is_retryable());
        assert!(EngineError::Storage(StoreError::Conflict("deadlock".into())).is_retryable());
        assert!(!EngineError::Storage(StoreError::Corrupt("bad row".into())).is_retryable());
        assert!(!EngineError::EmptyCart.is_retryable());
        assert!(!EngineError::AlreadyPaid(OrderId::new()).is_retryable());
    }

    #[test]
    fn order_errors_keep_their_kind() {
        let id = OrderId::new();
        let err: EngineError = OrderError::NotPending {
            order_id: id,
            status: OrderStatus::Delivered,
        }
        .into();
        assert_eq!(err.code(), "not_pending");

        let err: EngineError = OrderError::Domain(DomainError::validation("bad address")).into();
        match err {
            EngineError::Validation(msg) => assert_eq!(msg, "bad address"),
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn domain_errors_surface_as_validation() {
        let err: EngineError = "not-a-uuid".parse::<OrderId>().unwrap_err().into();
        assert_eq!(err.code(), "validation_error");
        assert!(!err.is_retryable());

        let err: EngineError = DomainError::validation("quantity must be positive").into();
        match err {
            EngineError::Validation(msg) => assert!(msg.contains("positive")),
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn body_hides_storage_details() {
        let body = EngineError::Storage(StoreError::Backend("password auth failed for user".into())).to_body();
        assert_eq!(body["error"], "storage_error");
        assert_eq!(body["message"], "storage failure");
        assert_eq!(body["retryable"], true);

        let body = EngineError::EmptyCart.to_body();
        assert_eq!(body["error"], "empty_cart");
        assert_eq!(body["message"], "cart is empty");
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            EngineError::EmptyCart,
            EngineError::InsufficientStock { product_id: ProductId::new() },
            EngineError::not_found(Resource::Order),
            EngineError::NotPending { order_id: OrderId::new(), status: OrderStatus::Cancelled },
            EngineError::InvalidTransition { from: OrderStatus::Delivered, to: OrderStatus::Cancelled },
            EngineError::PendingNotDeletable(OrderId::new()),
            EngineError::AmountMismatch { expected: Money::ZERO, found: Money::from_minor(1) },
            EngineError::AlreadyPaid(OrderId::new()),
            EngineError::OrderCancelled(OrderId::new()),
            EngineError::Validation("x".into()),
            EngineError::Forbidden("x".into()),
            EngineError::Storage(StoreError::Backend("x".into())),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
