//! Cart repository.
//!
//! Mutations run inside a transaction owned by the cart service, so the
//! locking reads and writes are associated functions taking the connection.
//! The buyer's `cart` row is the per-cart mutex: every mutation locks it
//! `FOR UPDATE` before touching lines.

use sqlx::{PgConnection, PgPool};

use bazaar_core::cart::VariantStock;
use bazaar_core::{CartId, LoginName, ProductId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartItem, CartLine};

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Read the buyer's cart with lines joined to variant, product and images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn read(&self, buyer: &LoginName) -> Result<Option<Cart>, RepositoryError> {
        let cart_id: Option<CartId> =
            sqlx::query_scalar("SELECT cart_id FROM bazaar.cart WHERE login_name = $1")
                .bind(buyer)
                .fetch_optional(self.pool)
                .await?;
        let Some(cart_id) = cart_id else {
            return Ok(None);
        };

        let items: Vec<CartItem> = sqlx::query_as(
            r"
            SELECT cl.product_id, cl.variant_name, cl.quantity,
                   v.price, v.in_stock_number,
                   p.name AS product_name, p.brand, p.seller_login_name,
                   COALESCE(
                       ARRAY(
                           SELECT i.url FROM bazaar.image i
                           WHERE i.product_id = cl.product_id AND i.variant_name = cl.variant_name
                           ORDER BY i.image_id
                       ),
                       '{}'
                   ) AS images
            FROM bazaar.cart_line cl
            JOIN bazaar.variant v
              ON v.product_id = cl.product_id AND v.variant_name = cl.variant_name
            JOIN bazaar.product p ON p.product_id = cl.product_id
            WHERE cl.cart_id = $1
            ORDER BY cl.product_id, cl.variant_name
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Cart::new(cart_id, buyer.clone(), items)))
    }

    /// Delete a line from the buyer's cart.
    ///
    /// Returns `false` when the buyer has no cart or the line does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_line(
        &self,
        buyer: &LoginName,
        product_id: ProductId,
        variant_name: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM bazaar.cart_line cl
            USING bazaar.cart c
            WHERE c.cart_id = cl.cart_id
              AND c.login_name = $1
              AND cl.product_id = $2
              AND cl.variant_name = $3
            ",
        )
        .bind(buyer)
        .bind(product_id)
        .bind(variant_name)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Transactional steps
    // =========================================================================

    /// Lock the buyer's cart row and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_cart(
        conn: &mut PgConnection,
        buyer: &LoginName,
    ) -> Result<Option<CartId>, RepositoryError> {
        let cart_id =
            sqlx::query_scalar("SELECT cart_id FROM bazaar.cart WHERE login_name = $1 FOR UPDATE")
                .bind(buyer)
                .fetch_optional(conn)
                .await?;
        Ok(cart_id)
    }

    /// Read a variant's price and stock, holding a share lock until commit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variant_stock(
        conn: &mut PgConnection,
        product_id: ProductId,
        variant_name: &str,
    ) -> Result<Option<VariantStock>, RepositoryError> {
        let row: Option<(i32, i32)> = sqlx::query_as(
            r"
            SELECT price, in_stock_number FROM bazaar.variant
            WHERE product_id = $1 AND variant_name = $2
            FOR SHARE
            ",
        )
        .bind(product_id)
        .bind(variant_name)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(|(price, in_stock)| VariantStock { price, in_stock }))
    }

    /// Current quantity of a line, if present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_quantity(
        conn: &mut PgConnection,
        cart_id: CartId,
        product_id: ProductId,
        variant_name: &str,
    ) -> Result<Option<i32>, RepositoryError> {
        let quantity = sqlx::query_scalar(
            r"
            SELECT quantity FROM bazaar.cart_line
            WHERE cart_id = $1 AND product_id = $2 AND variant_name = $3
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(variant_name)
        .fetch_optional(conn)
        .await?;
        Ok(quantity)
    }

    /// Insert a line or overwrite its quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn put_line(
        conn: &mut PgConnection,
        cart_id: CartId,
        product_id: ProductId,
        variant_name: &str,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let line = sqlx::query_as(
            r"
            INSERT INTO bazaar.cart_line (product_id, cart_id, variant_name, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id, cart_id, variant_name)
            DO UPDATE SET quantity = EXCLUDED.quantity
            RETURNING product_id, cart_id, variant_name, quantity
            ",
        )
        .bind(product_id)
        .bind(cart_id)
        .bind(variant_name)
        .bind(quantity)
        .fetch_one(conn)
        .await?;
        Ok(line)
    }

    /// Remove purchased `(product, variant)` lines from the buyer's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_purchased(
        conn: &mut PgConnection,
        buyer: &LoginName,
        product_ids: &[i32],
        variant_names: &[String],
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM bazaar.cart_line cl
            USING bazaar.cart c
            WHERE c.cart_id = cl.cart_id
              AND c.login_name = $1
              AND (cl.product_id, cl.variant_name) IN (
                  SELECT * FROM UNNEST($2::int4[], $3::text[])
              )
            ",
        )
        .bind(buyer)
        .bind(product_ids)
        .bind(variant_names)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
