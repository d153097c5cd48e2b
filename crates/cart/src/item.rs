use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spectr_core::{CartItemId, DomainError, DomainResult, Entity, Money, ProductId, UserId};
use spectr_inventory::validate_quantity;

/// One row per (user, product).
///
/// `unit_price` is captured when the line is added; `total_price` is always
/// `quantity × unit_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
        unit_price: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_quantity(quantity)?;
        if unit_price.is_negative() {
            return Err(DomainError::validation("unit price cannot be negative"));
        }

        Ok(Self {
            id: CartItemId::new(),
            user_id,
            product_id,
            quantity,
            unit_price,
            total_price: unit_price.times(quantity)?,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn set_quantity(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
        validate_quantity(quantity)?;
        self.total_price = self.unit_price.times(quantity)?;
        self.quantity = quantity;
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for CartItem {
    type Id = CartItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
