use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use spectr_core::{DomainError, DomainResult, Entity, Money, ProductId};

/// A catalog product as seen by the checkout engine.
///
/// Catalog fields are owned by product management; the engine only ever
/// changes `stock_quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub price: Money,
    pub stock_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A reservation asked for more units than the product has.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("product {product_id} does not have enough stock (requested {requested}, available {available})")]
pub struct InsufficientStock {
    pub product_id: ProductId,
    pub requested: i64,
    pub available: i64,
}

/// Order and cart quantities are strictly positive.
pub fn validate_quantity(quantity: i64) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::validation(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    Ok(())
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Money,
        stock_quantity: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if price.is_negative() {
            return Err(DomainError::validation("product price cannot be negative"));
        }
        if stock_quantity < 0 {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }

        Ok(Self {
            id,
            name,
            description: String::new(),
            category: None,
            price,
            stock_quantity,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether a reservation of `quantity` would succeed right now.
    pub fn can_reserve(&self, quantity: i64) -> bool {
        quantity > 0 && !self.is_deleted() && self.stock_quantity >= quantity
    }

    /// Compare-and-decrement. Leaves the product untouched on failure.
    pub fn reserve(&mut self, quantity: i64, now: DateTime<Utc>) -> Result<(), InsufficientStock> {
        if !self.can_reserve(quantity) {
            return Err(InsufficientStock {
                product_id: self.id,
                requested: quantity,
                available: if self.is_deleted() { 0 } else { self.stock_quantity },
            });
        }
        self.stock_quantity -= quantity;
        self.updated_at = now;
        Ok(())
    }

    /// Unconditional restock. Soft deletion does not block it.
    pub fn release(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
        validate_quantity(quantity)?;
        self.stock_quantity = self
            .stock_quantity
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("stock quantity overflow"))?;
        self.updated_at = now;
        Ok(())
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(now);
            self.updated_at = now;
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
