use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

use spectr_core::{Money, OrderId, PaymentId, UserId};
use spectr_infra::{CommerceStore, StoreTx};
use spectr_orders::OrderStatus;
use spectr_payments::{Confirmation, Payment};
use spectr_stats::StatsDelta;

use crate::tx::{discard, finish};
use crate::{stats_aggregator, EngineError, Resource};

/// Result of a confirmation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    /// This call completed the payment and recorded the sale.
    Completed { order_id: OrderId, amount: Money },
    /// The payment was already completed; nothing changed.
    AlreadyCompleted,
}

/// Payment creation and confirmation against their orders.
#[derive(Debug, Clone)]
pub struct PaymentLedger<S> {
    store: S,
}

impl<S: CommerceStore> PaymentLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Open a pending payment for the order's current total.
    #[instrument(skip(self), err)]
    pub async fn create(&self, order_id: OrderId, owner: Option<UserId>) -> Result<Payment, EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = create_in(tx.as_mut(), order_id, owner).await;
        let payment = finish(tx, outcome).await?;
        info!(payment_id = %payment.id, amount = %payment.amount, "payment created");
        Ok(payment)
    }

    /// Complete a payment, mark its order paid and record the sale.
    ///
    /// Confirmation is idempotent: only the call that flips the payment from
    /// pending to completed touches the order or the statistics.
    #[instrument(skip(self), err)]
    pub async fn confirm(
        &self,
        payment_id: PaymentId,
        owner: Option<UserId>,
    ) -> Result<ConfirmOutcome, EngineError> {
        let mut tx = self.store.begin().await?;
        let outcome = confirm_in(tx.as_mut(), payment_id, owner).await;
        match outcome {
            Ok(ConfirmOutcome::AlreadyCompleted) => {
                discard(tx).await;
                info!("payment already completed");
                Ok(ConfirmOutcome::AlreadyCompleted)
            }
            outcome => {
                let outcome = finish(tx, outcome).await?;
                if let ConfirmOutcome::Completed { order_id, amount } = outcome {
                    info!(%order_id, %amount, "payment confirmed");
                }
                Ok(outcome)
            }
        }
    }
}

async fn create_in(
    tx: &mut dyn StoreTx,
    order_id: OrderId,
    owner: Option<UserId>,
) -> Result<Payment, EngineError> {
    let order = tx
        .order(order_id, owner)
        .await?
        .ok_or(EngineError::not_found(Resource::Order))?;

    let payment = Payment::for_order(&order, Utc::now())?;
    tx.insert_payment(&payment).await?;
    Ok(payment)
}

async fn confirm_in(
    tx: &mut dyn StoreTx,
    payment_id: PaymentId,
    owner: Option<UserId>,
) -> Result<ConfirmOutcome, EngineError> {
    // Payments are reachable only through an order the caller owns.
    let payment = tx
        .payment(payment_id, owner)
        .await?
        .ok_or(EngineError::not_found(Resource::Payment))?;
    // A completed payment stays confirmable after its order is deleted.
    if payment.is_completed() {
        return Ok(ConfirmOutcome::AlreadyCompleted);
    }

    let order = tx
        .order(payment.order_id, owner)
        .await?
        .ok_or(EngineError::not_found(Resource::Payment))?;

    let (amount, lines) = match payment.confirm_against(&order)? {
        Confirmation::AlreadyCompleted => return Ok(ConfirmOutcome::AlreadyCompleted),
        Confirmation::Complete { amount, lines } => (amount, lines),
    };

    if !tx.complete_payment(payment_id).await? {
        // A concurrent confirmation won the flip.
        return Ok(ConfirmOutcome::AlreadyCompleted);
    }
    if !tx.mark_order_paid(order.id).await? {
        let current = tx.order(order.id, None).await?;
        return Err(match current {
            Some(order) if order.status == OrderStatus::Cancelled => EngineError::OrderCancelled(order.id),
            _ => EngineError::AlreadyPaid(order.id),
        });
    }

    stats_aggregator::apply(tx, &StatsDelta::sale(lines, amount)).await?;

    Ok(ConfirmOutcome::Completed {
        order_id: order.id,
        amount,
    })
}
