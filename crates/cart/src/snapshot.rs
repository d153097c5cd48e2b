use serde::{Deserialize, Serialize};

use spectr_core::{DomainResult, Money, ProductId, UserId, ValueObject};

use crate::CartItem;

/// A cart line as read at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl ValueObject for CartLine {}

impl CartLine {
    pub fn new(product_id: ProductId, quantity: i64, unit_price: Money) -> DomainResult<Self> {
        Ok(Self {
            product_id,
            quantity,
            unit_price,
            line_total: unit_price.times(quantity)?,
        })
    }
}

impl TryFrom<&CartItem> for CartLine {
    type Error = spectr_core::DomainError;

    /// Recomputes the line total instead of trusting the stored one.
    fn try_from(item: &CartItem) -> Result<Self, Self::Error> {
        CartLine::new(item.product_id, item.quantity, item.unit_price)
    }
}

/// Point-in-time view of a user's cart.
///
/// An empty snapshot is valid and means "nothing to order".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub user_id: UserId,
    lines: Vec<CartLine>,
}

impl CartSnapshot {
    pub fn new(user_id: UserId, lines: Vec<CartLine>) -> Self {
        Self { user_id, lines }
    }

    pub fn from_items(user_id: UserId, items: &[CartItem]) -> DomainResult<Self> {
        let lines = items
            .iter()
            .map(CartLine::try_from)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Self::new(user_id, lines))
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> DomainResult<Money> {
        Money::sum(self.lines.iter().map(|l| l.line_total))
    }
}
