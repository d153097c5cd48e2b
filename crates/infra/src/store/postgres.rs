//! Postgres-backed commerce store.
//!
//! Each [`StoreTx`] wraps one database transaction. The contended writes are
//! single conditional `UPDATE`s whose `WHERE` clause carries the business
//! check, so row locks plus re-evaluation under READ COMMITTED serialize
//! competing checkouts, cancellations and confirmations without explicit
//! locking.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (serialization failure / deadlock) | `40001` / `40P01` | `Conflict` |
//! | Database (foreign key / check violation) | `23503` / `23514` | `Constraint` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` |
//! | Column decode failures | N/A | `Corrupt` |
//! | Other | N/A | `Backend` |

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::{instrument, Span};
use uuid::Uuid;

use spectr_cart::CartItem;
use spectr_core::{CartItemId, Money, OrderId, OrderItemId, PaymentId, ProductId, UserId};
use spectr_inventory::Product;
use spectr_orders::{Order, OrderItem, OrderStatus, PaymentStatus};
use spectr_payments::Payment;
use spectr_stats::{AppStats, StatsDelta};

use super::r#trait::{CommerceStore, StoreError, StoreTx};

/// Postgres-backed commerce store.
///
/// `Send + Sync`; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CommerceStore for PostgresStore {
    #[instrument(skip(self), err)]
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(Box::new(PgStoreTx { tx }))
    }
}

struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

const ORDER_COLUMNS: &str = r#"
    id, user_id, total_amount, shipping_address, status, payment_status,
    created_at, updated_at, deleted_at
"#;

const ORDER_ITEM_COLUMNS: &str = r#"
    id, order_id, product_id, quantity, unit_price, total_price, created_at
"#;

impl PgStoreTx {
    async fn items_for(&mut self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderItem>>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, line_no"
        ))
        .bind(order_ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("load_order_items", e))?;

        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let item = OrderItemRow::from_row(&row)
                .map_err(|e| StoreError::Corrupt(format!("failed to decode order item row: {e}")))?;
            by_order.entry(item.order_id).or_default().push(item.into());
        }
        Ok(by_order)
    }
}

#[async_trait]
impl StoreTx for PgStoreTx {
    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn insert_product(&mut self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, category, price, stock_quantity,
                created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category.as_deref())
        .bind(product.price.minor_units())
        .bind(product.stock_quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.deleted_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, category, price, stock_quantity,
                   created_at, updated_at, deleted_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("load_product", e))?;

        row.map(|row| {
            ProductRow::from_row(&row)
                .map(Product::from)
                .map_err(|e| StoreError::Corrupt(format!("failed to decode product row: {e}")))
        })
        .transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn soft_delete_product(&mut self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("soft_delete_product", e))?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, item), fields(user_id = %item.user_id, product_id = %item.product_id), err)]
    async fn upsert_cart_item(&mut self, item: &CartItem) -> Result<CartItem, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO cart_items (
                id, user_id, product_id, quantity, unit_price, total_price,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET
                quantity = EXCLUDED.quantity,
                unit_price = EXCLUDED.unit_price,
                total_price = EXCLUDED.total_price,
                updated_at = EXCLUDED.updated_at
            RETURNING id, user_id, product_id, quantity, unit_price, total_price,
                      created_at, updated_at
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.user_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(item.quantity)
        .bind(item.unit_price.minor_units())
        .bind(item.total_price.minor_units())
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_cart_item", e))?;

        CartItemRow::from_row(&row)
            .map(CartItem::from)
            .map_err(|e| StoreError::Corrupt(format!("failed to decode cart item row: {e}")))
    }

    #[instrument(skip(self), fields(user_id = %user_id, line_count), err)]
    async fn cart_items(&mut self, user_id: UserId) -> Result<Vec<CartItem>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, product_id, quantity, unit_price, total_price,
                   created_at, updated_at
            FROM cart_items
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("load_cart", e))?;

        let items = rows
            .iter()
            .map(|row| CartItemRow::from_row(row).map(CartItem::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Corrupt(format!("failed to decode cart item row: {e}")))?;

        Span::current().record("line_count", items.len());
        Ok(items)
    }

    #[instrument(skip(self), fields(user_id = %user_id, rows_affected), err)]
    async fn clear_cart(&mut self, user_id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("clear_cart", e))?;

        Span::current().record("rows_affected", result.rows_affected());
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(product_id = %product_id, rows_affected), err)]
    async fn reserve_stock(&mut self, product_id: ProductId, quantity: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $2, updated_at = NOW()
            WHERE id = $1
              AND deleted_at IS NULL
              AND $2 > 0
              AND stock_quantity >= $2
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(quantity)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("reserve_stock", e))?;

        Span::current().record("rows_affected", result.rows_affected());
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(product_id = %product_id, rows_affected), err)]
    async fn release_stock(&mut self, product_id: ProductId, quantity: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(quantity)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("release_stock", e))?;

        Span::current().record("rows_affected", result.rows_affected());
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, order), fields(order_id = %order.id, item_count = order.items.len()), err)]
    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, total_amount, shipping_address, status, payment_status,
                created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.total_amount.minor_units())
        .bind(&order.shipping_address)
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.deleted_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        for (line_no, item) in order.items.iter().enumerate() {
            let line_no = i32::try_from(line_no)
                .map_err(|_| StoreError::Constraint("too many order lines".to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, line_no, product_id, quantity, unit_price, total_price, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(item.order_id.as_uuid())
            .bind(line_no)
            .bind(item.product_id.as_uuid())
            .bind(item.quantity)
            .bind(item.unit_price.minor_units())
            .bind(item.total_price.minor_units())
            .bind(item.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order_item", e))?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn order(&mut self, id: OrderId, owner: Option<UserId>) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE id = $1
              AND deleted_at IS NULL
              AND ($2::uuid IS NULL OR user_id = $2)
            "#
        ))
        .bind(id.as_uuid())
        .bind(owner.map(Uuid::from))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("load_order", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order_row = OrderRow::decode(&row)?;
        let mut items = self.items_for(&[order_row.id]).await?;
        let items = items.remove(&order_row.id).unwrap_or_default();
        order_row.into_order(items).map(Some)
    }

    #[instrument(skip(self), fields(order_count), err)]
    async fn orders(&mut self, owner: Option<UserId>) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE deleted_at IS NULL
              AND ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(owner.map(Uuid::from))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        let order_rows = rows
            .iter()
            .map(OrderRow::decode)
            .collect::<Result<Vec<_>, _>>()?;
        let ids: Vec<Uuid> = order_rows.iter().map(|r| r.id).collect();
        let mut items = self.items_for(&ids).await?;

        let orders = order_rows
            .into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Span::current().record("order_count", orders.len());
        Ok(orders)
    }

    #[instrument(skip(self), fields(order_id = %id, from = %from, to = %to, rows_affected), err)]
    async fn transition_order_status(
        &mut self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("transition_order_status", e))?;

        Span::current().record("rows_affected", result.rows_affected());
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(order_id = %id, rows_affected), err)]
    async fn mark_order_paid(&mut self, id: OrderId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = 'completed', updated_at = NOW()
            WHERE id = $1
              AND payment_status = 'pending'
              AND status <> 'cancelled'
              AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("mark_order_paid", e))?;

        Span::current().record("rows_affected", result.rows_affected());
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn soft_delete_order(&mut self, id: OrderId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status <> 'pending' AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("soft_delete_order", e))?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, payment), fields(payment_id = %payment.id, order_id = %payment.order_id), err)]
    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, amount, payment_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.order_id.as_uuid())
        .bind(payment.amount.minor_units())
        .bind(payment.payment_status.as_str())
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_payment", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(payment_id = %id), err)]
    async fn payment(&mut self, id: PaymentId, owner: Option<UserId>) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.order_id, p.amount, p.payment_status, p.created_at, p.updated_at
            FROM payments p
            JOIN orders o ON o.id = p.order_id
            WHERE p.id = $1
              AND ($2::uuid IS NULL OR o.user_id = $2)
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.map(Uuid::from))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("load_payment", e))?;

        row.map(|row| {
            let payment_row = PaymentRow::from_row(&row)
                .map_err(|e| StoreError::Corrupt(format!("failed to decode payment row: {e}")))?;
            Payment::try_from(payment_row)
        })
        .transpose()
    }

    #[instrument(skip(self), fields(payment_id = %id, rows_affected), err)]
    async fn complete_payment(&mut self, id: PaymentId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET payment_status = 'completed', updated_at = NOW()
            WHERE id = $1 AND payment_status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("complete_payment", e))?;

        Span::current().record("rows_affected", result.rows_affected());
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), err)]
    async fn increment_stats(&mut self, delta: &StatsDelta) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO app_stats (id, total_users, total_sales, total_products_sold, total_revenue)
            VALUES (1, $1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                total_users = app_stats.total_users + EXCLUDED.total_users,
                total_sales = app_stats.total_sales + EXCLUDED.total_sales,
                total_products_sold = app_stats.total_products_sold + EXCLUDED.total_products_sold,
                total_revenue = app_stats.total_revenue + EXCLUDED.total_revenue
            "#,
        )
        .bind(delta.users)
        .bind(delta.sales)
        .bind(delta.products_sold)
        .bind(delta.revenue.minor_units())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("increment_stats", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn stats(&mut self) -> Result<AppStats, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT total_users, total_sales, total_products_sold, total_revenue
            FROM app_stats
            WHERE id = 1
            "#,
        )
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("load_stats", e))?;

        match row {
            Some(row) => Ok(AppStats {
                total_users: row.try_get("total_users").map_err(decode_error)?,
                total_sales: row.try_get("total_sales").map_err(decode_error)?,
                total_products_sold: row.try_get("total_products_sold").map_err(decode_error)?,
                total_revenue: Money::from_minor(row.try_get("total_revenue").map_err(decode_error)?),
            }),
            None => Ok(AppStats::default()),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let PgStoreTx { tx } = *self;
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let PgStoreTx { tx } = *self;
        tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))
    }
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("40001") | Some("40P01") => StoreError::Conflict(msg),
                Some("23503") | Some("23514") => StoreError::Constraint(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool unavailable in {}", operation))
        }
        sqlx::Error::Io(io) => StoreError::Unavailable(format!("io error in {}: {}", operation, io)),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(format!("decode error in {}: {}", operation, err))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn decode_error(err: sqlx::Error) -> StoreError {
    StoreError::Corrupt(err.to_string())
}

fn parse_column<T>(value: &str, column: &str) -> Result<T, StoreError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    value
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("{column}: {e}")))
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    category: Option<String>,
    price: i64,
    stock_quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            price: row.try_get("price")?,
            stock_quantity: row.try_get("stock_quantity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            category: row.category,
            price: Money::from_minor(row.price),
            stock_quantity: row.stock_quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug)]
struct CartItemRow {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    unit_price: i64,
    total_price: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for CartItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CartItemRow {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            total_price: row.try_get("total_price")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: CartItemId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            product_id: ProductId::from_uuid(row.product_id),
            quantity: row.quantity,
            unit_price: Money::from_minor(row.unit_price),
            total_price: Money::from_minor(row.total_price),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    total_amount: i64,
    shipping_address: String,
    status: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderRow {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            total_amount: row.try_get("total_amount")?,
            shipping_address: row.try_get("shipping_address")?,
            status: row.try_get("status")?,
            payment_status: row.try_get("payment_status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

impl OrderRow {
    fn decode(row: &PgRow) -> Result<Self, StoreError> {
        OrderRow::from_row(row)
            .map_err(|e| StoreError::Corrupt(format!("failed to decode order row: {e}")))
    }

    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, StoreError> {
        Ok(Order {
            id: OrderId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            total_amount: Money::from_minor(self.total_amount),
            shipping_address: self.shipping_address,
            status: parse_column::<OrderStatus>(&self.status, "orders.status")?,
            payment_status: parse_column::<PaymentStatus>(&self.payment_status, "orders.payment_status")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
            items,
        })
    }
}

#[derive(Debug)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    unit_price: i64,
    total_price: i64,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for OrderItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderItemRow {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            total_price: row.try_get("total_price")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: OrderItemId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            product_id: ProductId::from_uuid(row.product_id),
            quantity: row.quantity,
            unit_price: Money::from_minor(row.unit_price),
            total_price: Money::from_minor(row.total_price),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    amount: i64,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for PaymentRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PaymentRow {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            amount: row.try_get("amount")?,
            payment_status: row.try_get("payment_status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            amount: Money::from_minor(row.amount),
            payment_status: parse_column(&row.payment_status, "payments.payment_status")?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
