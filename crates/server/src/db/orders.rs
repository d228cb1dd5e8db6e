//! Order repository.
//!
//! Writes are associated functions over an open connection; the order
//! service drives them inside a single transaction.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};

use bazaar_core::order::{PlannedLine, ResolvedVariant};
use bazaar_core::{AddressId, LoginName, OrderId, ProductId, SubOrderId};

use super::RepositoryError;
use crate::models::order::{Address, OrderDetails, OrderSummary, SubOrder, SubOrderDetail};

const ORDER_COLUMNS: &str =
    "order_id, buyer_login_name, address_id, provider_name, account_id, total_price, created_at";

/// Header fields of a new order.
#[derive(Debug, Clone, Copy)]
pub struct NewOrder<'a> {
    pub buyer: &'a LoginName,
    pub address_id: AddressId,
    pub provider_name: &'a str,
    pub account_id: Option<&'a str>,
    pub total_price: i64,
}

/// Fields of a new sub-order.
#[derive(Debug, Clone, Copy)]
pub struct NewSubOrder<'a> {
    pub order_id: OrderId,
    pub seller: &'a LoginName,
    pub delivery_method_name: &'a str,
    pub delivery_provider_name: &'a str,
    pub delivery_price: i32,
    pub total_sku_price: i64,
    pub actual_date: NaiveDate,
    pub expected_date: NaiveDate,
}

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

    /// List a buyer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_buyer(
        &self,
        buyer: &LoginName,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let orders = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM bazaar.orders
             WHERE buyer_login_name = $1
             ORDER BY created_at DESC, order_id DESC"
        ))
        .bind(buyer)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// Read the full order tree.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_details(&self, id: OrderId) -> Result<Option<OrderDetails>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::read_details(&mut conn, id).await
    }

    // =========================================================================
    // Transactional steps
    // =========================================================================

    /// Read the full order tree on an existing connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn read_details(
        conn: &mut PgConnection,
        id: OrderId,
    ) -> Result<Option<OrderDetails>, RepositoryError> {
        let order: Option<OrderSummary> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM bazaar.orders WHERE order_id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        let Some(order) = order else {
            return Ok(None);
        };

        let address: Option<Address> = sqlx::query_as(
            r"
            SELECT address_id, recipient_name, phone, street, district, city
            FROM bazaar.address WHERE address_id = $1
            ",
        )
        .bind(order.address_id)
        .fetch_optional(&mut *conn)
        .await?;

        let sub_orders: Vec<SubOrder> = sqlx::query_as(
            r"
            SELECT sub_order_id, seller_login_name, delivery_method_name,
                   delivery_provider_name, delivery_price, total_sku_price,
                   actual_date, expected_date
            FROM bazaar.sub_order
            WHERE order_id = $1
            ORDER BY sub_order_id
            ",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        let details: Vec<SubOrderDetail> = sqlx::query_as(
            r"
            SELECT d.sub_order_id, d.product_id, d.variant_name, d.quantity, d.unit_price,
                   p.name AS product_name
            FROM bazaar.sub_order_detail d
            JOIN bazaar.sub_order s ON s.sub_order_id = d.sub_order_id
            JOIN bazaar.product p ON p.product_id = d.product_id
            WHERE s.order_id = $1
            ORDER BY d.sub_order_id, d.product_id, d.variant_name
            ",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(OrderDetails::assemble(order, address, sub_orders, details)))
    }

    /// Lock the requested variants `FOR UPDATE` in key order and resolve
    /// their sellers. Unmatched keys are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_variants(
        conn: &mut PgConnection,
        product_ids: &[i32],
        variant_names: &[String],
    ) -> Result<Vec<ResolvedVariant>, RepositoryError> {
        let rows: Vec<(ProductId, String, LoginName, i32, i32)> = sqlx::query_as(
            r"
            SELECT v.product_id, v.variant_name, p.seller_login_name, v.price, v.in_stock_number
            FROM bazaar.variant v
            JOIN bazaar.product p ON p.product_id = v.product_id
            WHERE (v.product_id, v.variant_name) IN (
                SELECT * FROM UNNEST($1::int4[], $2::text[])
            )
            ORDER BY v.product_id, v.variant_name
            FOR UPDATE OF v
            ",
        )
        .bind(product_ids)
        .bind(variant_names)
        .fetch_all(conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(product_id, variant_name, seller, price, in_stock)| ResolvedVariant {
                    product_id,
                    variant_name,
                    seller,
                    price,
                    in_stock,
                },
            )
            .collect())
    }

    /// Insert the order header.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey` for an unknown address or payment provider.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert_order(
        conn: &mut PgConnection,
        order: NewOrder<'_>,
    ) -> Result<OrderSummary, RepositoryError> {
        let row = sqlx::query_as(&format!(
            "INSERT INTO bazaar.orders
                (buyer_login_name, address_id, provider_name, account_id, total_price)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.buyer)
        .bind(order.address_id)
        .bind(order.provider_name)
        .bind(order.account_id)
        .bind(order.total_price)
        .fetch_one(conn)
        .await?;
        Ok(row)
    }

    /// Insert a sub-order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey` for an unknown delivery method or provider.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert_sub_order(
        conn: &mut PgConnection,
        sub_order: NewSubOrder<'_>,
    ) -> Result<SubOrderId, RepositoryError> {
        let id = sqlx::query_scalar(
            r"
            INSERT INTO bazaar.sub_order
                (order_id, seller_login_name, delivery_method_name, delivery_provider_name,
                 delivery_price, total_sku_price, actual_date, expected_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING sub_order_id
            ",
        )
        .bind(sub_order.order_id)
        .bind(sub_order.seller)
        .bind(sub_order.delivery_method_name)
        .bind(sub_order.delivery_provider_name)
        .bind(sub_order.delivery_price)
        .bind(sub_order.total_sku_price)
        .bind(sub_order.actual_date)
        .bind(sub_order.expected_date)
        .fetch_one(conn)
        .await?;
        Ok(id)
    }

    /// Insert a sub-order line with its unit price snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_detail(
        conn: &mut PgConnection,
        sub_order_id: SubOrderId,
        line: &PlannedLine,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO bazaar.sub_order_detail
                (sub_order_id, product_id, variant_name, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(sub_order_id)
        .bind(line.product_id)
        .bind(&line.variant_name)
        .bind(line.quantity)
        .bind(line.unit_price)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Take purchased units out of stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::CheckViolation` if stock would go negative.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn decrement_stock(
        conn: &mut PgConnection,
        line: &PlannedLine,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE bazaar.variant SET in_stock_number = in_stock_number - $3
            WHERE product_id = $1 AND variant_name = $2
            ",
        )
        .bind(line.product_id)
        .bind(&line.variant_name)
        .bind(line.quantity)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Add to a seller's running earnings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the seller row is missing.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn credit_seller(
        conn: &mut PgConnection,
        seller: &LoginName,
        amount: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE bazaar.seller SET money_earned = money_earned + $2 WHERE login_name = $1",
        )
        .bind(seller)
        .bind(amount)
        .execute(conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Add to a buyer's running spend.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the buyer row is missing.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn debit_buyer(
        conn: &mut PgConnection,
        buyer: &LoginName,
        amount: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE bazaar.buyer SET money_spent = money_spent + $2 WHERE login_name = $1",
        )
        .bind(buyer)
        .bind(amount)
        .execute(conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
