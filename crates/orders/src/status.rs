use core::str::FromStr;

use serde::{Deserialize, Serialize};

use spectr_core::DomainError;

use crate::OrderError;

/// Order status lifecycle: `pending` then exactly one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Cancelled,
    Delivered,
}

/// Outcome of applying a target status to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// Target equals the current status; nothing to write.
    Unchanged,
    /// `pending -> to`. Cancellation restocks every item.
    Apply { to: OrderStatus, restock: bool },
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Decide how moving to `target` plays out.
    ///
    /// Re-applying the current status is an idempotent success (this includes
    /// `pending` on a pending order). Otherwise only `pending -> delivered` and
    /// `pending -> cancelled` are legal.
    pub fn plan_transition(self, target: OrderStatus) -> Result<StatusChange, OrderError> {
        if self == target {
            return Ok(StatusChange::Unchanged);
        }
        if self != OrderStatus::Pending || !target.is_terminal() {
            return Err(OrderError::InvalidTransition {
                from: self,
                to: target,
            });
        }
        Ok(StatusChange::Apply {
            to: target,
            restock: target == OrderStatus::Cancelled,
        })
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(DomainError::validation(format!("unknown order status '{other}'"))),
        }
    }
}

/// Payment state, shared by orders and payment records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
        }
    }
}

impl core::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            other => Err(DomainError::validation(format!("unknown payment status '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pending_may_move_to_either_terminal_state() {
        assert_eq!(
            OrderStatus::Pending.plan_transition(OrderStatus::Delivered).unwrap(),
            StatusChange::Apply { to: OrderStatus::Delivered, restock: false }
        );
        assert_eq!(
            OrderStatus::Pending.plan_transition(OrderStatus::Cancelled).unwrap(),
            StatusChange::Apply { to: OrderStatus::Cancelled, restock: true }
        );
    }

    #[test]
    fn same_status_is_a_no_op() {
        for status in [OrderStatus::Pending, OrderStatus::Cancelled, OrderStatus::Delivered] {
            assert_eq!(status.plan_transition(status).unwrap(), StatusChange::Unchanged);
        }
    }

    #[test]
    fn terminal_states_reject_further_transitions() {
        match OrderStatus::Delivered.plan_transition(OrderStatus::Cancelled) {
            Err(OrderError::InvalidTransition { from, to }) => {
                assert_eq!(from, OrderStatus::Delivered);
                assert_eq!(to, OrderStatus::Cancelled);
            }
            other => panic!("Expected InvalidTransition, got {other:?}"),
        }
        assert!(OrderStatus::Cancelled.plan_transition(OrderStatus::Pending).is_err());
    }

    #[test]
    fn parses_storage_representation() {
        for status in [OrderStatus::Pending, OrderStatus::Cancelled, OrderStatus::Delivered] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert_eq!("completed".parse::<PaymentStatus>().unwrap(), PaymentStatus::Completed);
    }

    fn any_status() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::Pending),
            Just(OrderStatus::Cancelled),
            Just(OrderStatus::Delivered),
        ]
    }

    proptest! {
        /// Whatever targets are applied, a pending order changes state at most once.
        #[test]
        fn at_most_one_transition_from_pending(targets in prop::collection::vec(any_status(), 0..20)) {
            let mut current = OrderStatus::Pending;
            let mut applied = 0;

            for target in targets {
                if let Ok(StatusChange::Apply { to, .. }) = current.plan_transition(target) {
                    current = to;
                    applied += 1;
                }
            }

            prop_assert!(applied <= 1);
            prop_assert!(applied == 0 || current.is_terminal());
        }
    }
}
