//! Sales rows feeding the per-product statistics.

use chrono::NaiveDate;
use sqlx::PgPool;

use bazaar_core::ProductId;
use bazaar_core::statistics::SaleRecord;

use super::RepositoryError;

/// Repository for statistics reads.
pub struct StatisticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatisticsRepository<'a> {
    /// Create a new statistics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every sold line of a product, priced at the variant's current price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<SaleRecord>, RepositoryError> {
        let rows: Vec<(String, i32, i32, Option<NaiveDate>)> = sqlx::query_as(
            r"
            SELECT d.variant_name, d.quantity, v.price, s.actual_date
            FROM bazaar.sub_order_detail d
            JOIN bazaar.sub_order s ON s.sub_order_id = d.sub_order_id
            JOIN bazaar.variant v
              ON v.product_id = d.product_id AND v.variant_name = d.variant_name
            WHERE d.product_id = $1
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(variant_name, quantity, price, actual_date)| SaleRecord {
                variant_name,
                quantity,
                price,
                actual_date,
            })
            .collect())
    }
}
