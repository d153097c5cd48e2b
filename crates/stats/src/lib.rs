//! Business statistics: the `AppStats` singleton and additive deltas.

use serde::{Deserialize, Serialize};

use spectr_core::{Money, ValueObject};

/// Running totals kept in a single row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppStats {
    pub total_users: i64,
    pub total_sales: i64,
    pub total_products_sold: i64,
    pub total_revenue: Money,
}

/// Relative increments applied atomically to [`AppStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDelta {
    pub users: i64,
    pub sales: i64,
    pub products_sold: i64,
    pub revenue: Money,
}

impl ValueObject for StatsDelta {}

impl StatsDelta {
    /// One new account.
    pub fn signup() -> Self {
        Self {
            users: 1,
            ..Self::default()
        }
    }

    /// One completed sale of `lines` order lines for `revenue`.
    pub fn sale(lines: u64, revenue: Money) -> Self {
        Self {
            sales: 1,
            products_sold: i64::try_from(lines).unwrap_or(i64::MAX),
            revenue,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AppStats {
    /// Apply a delta, saturating instead of wrapping.
    pub fn apply(&mut self, delta: &StatsDelta) {
        self.total_users = self.total_users.saturating_add(delta.users);
        self.total_sales = self.total_sales.saturating_add(delta.sales);
        self.total_products_sold = self.total_products_sold.saturating_add(delta.products_sold);
        self.total_revenue = Money::from_minor(
            self.total_revenue
                .minor_units()
                .saturating_add(delta.revenue.minor_units()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_delta_touches_sales_counters_only() {
        let delta = StatsDelta::sale(1, Money::from_minor(30));
        assert_eq!(delta.users, 0);
        assert_eq!(delta.sales, 1);
        assert_eq!(delta.products_sold, 1);
        assert_eq!(delta.revenue, Money::from_minor(30));
    }

    #[test]
    fn deltas_compose_additively() {
        let mut stats = AppStats::default();
        stats.apply(&StatsDelta::signup());
        stats.apply(&StatsDelta::signup());
        stats.apply(&StatsDelta::sale(3, Money::from_minor(500)));

        assert_eq!(
            stats,
            AppStats {
                total_users: 2,
                total_sales: 1,
                total_products_sold: 3,
                total_revenue: Money::from_minor(500),
            }
        );
    }

    #[test]
    fn default_delta_is_empty() {
        assert!(StatsDelta::default().is_empty());
        assert!(!StatsDelta::signup().is_empty());
    }
}
