//! Order repository for database operations.
//!
//! The snapshot parts of an order (line items, shipping address, payment
//! result) are JSONB columns; status flags and money fields are plain
//! columns so they can be filtered and summed in SQL.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use bramble_core::{CartTotals, OrderId, PaymentMethod, ShippingAddress, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem, PaymentResult};

/// Fields for creating an order in the `Created` state.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub totals: CartTotals,
}

/// An order joined with the customer it belongs to (admin listing).
#[derive(Debug)]
pub struct OrderWithCustomer {
    pub order: Order,
    pub customer_name: String,
    pub customer_email: String,
}

/// Database row shape for an order.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    items: Json<Vec<OrderItem>>,
    shipping_address: Json<ShippingAddress>,
    payment_method: String,
    items_price: Decimal,
    shipping_price: Decimal,
    tax_price: Decimal,
    total_price: Decimal,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    payment_result: Option<Json<PaymentResult>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let payment_method = self.payment_method.parse::<PaymentMethod>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment method in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            items: self.items.0,
            shipping_address: self.shipping_address.0,
            payment_method,
            items_price: self.items_price,
            shipping_price: self.shipping_price,
            tax_price: self.tax_price,
            total_price: self.total_price,
            is_paid: self.is_paid,
            paid_at: self.paid_at,
            is_delivered: self.is_delivered,
            delivered_at: self.delivered_at,
            payment_result: self.payment_result.map(|r| r.0),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, items, shipping_address, payment_method, \
     items_price, shipping_price, tax_price, total_price, \
     is_paid, paid_at, is_delivered, delivered_at, payment_result, \
     created_at, updated_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order in the `Created` state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders \
                 (user_id, items, shipping_address, payment_method, \
                  items_price, shipping_price, tax_price, total_price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new.user_id.as_i32())
        .bind(Json(&new.items))
        .bind(Json(&new.shipping_address))
        .bind(new.payment_method.to_string())
        .bind(new.totals.items_price)
        .bind(new.totals.shipping_price)
        .bind(new.totals.tax_price)
        .bind(new.totals.total_price)
        .fetch_one(self.pool)
        .await?;

        row.into_order()
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// List all orders with their customers, newest first (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<OrderWithCustomer>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct AdminOrderRow {
            #[sqlx(flatten)]
            order: OrderRow,
            customer_name: String,
            customer_email: String,
        }

        let rows = sqlx::query_as::<_, AdminOrderRow>(
            "SELECT o.id, o.user_id, o.items, o.shipping_address, o.payment_method, \
                    o.items_price, o.shipping_price, o.tax_price, o.total_price, \
                    o.is_paid, o.paid_at, o.is_delivered, o.delivered_at, o.payment_result, \
                    o.created_at, o.updated_at, \
                    u.name AS customer_name, u.email AS customer_email \
             FROM orders o \
             JOIN users u ON u.id = o.user_id \
             ORDER BY o.created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(OrderWithCustomer {
                    order: r.order.into_order()?,
                    customer_name: r.customer_name,
                    customer_email: r.customer_email,
                })
            })
            .collect()
    }

    /// Flip the order to paid, storing the payment result.
    ///
    /// Last write wins under concurrent calls; the lifecycle guards run
    /// in the handler before this is reached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_paid(
        &self,
        id: OrderId,
        result: &PaymentResult,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET \
                 is_paid = TRUE, paid_at = now(), payment_result = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(Json(result))
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_order()
    }

    /// Flip the order to delivered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_delivered(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET \
                 is_delivered = TRUE, delivered_at = now(), updated_at = now() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_order()
    }
}
