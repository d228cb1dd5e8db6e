//! Statistics Aggregator.

use tracing::instrument;

use bazaar_core::statistics::{ProductStatistics, aggregate};
use bazaar_core::{DomainError, LoginName, ProductId};

use super::{ServiceError, log_failure};
use crate::db::{CatalogRepository, StatisticsRepository, StorageContext};

pub struct StatisticsService<'a> {
    storage: StorageContext<'a>,
}

impl<'a> StatisticsService<'a> {
    #[must_use]
    pub const fn new(storage: StorageContext<'a>) -> Self {
        Self { storage }
    }

    /// Sales statistics of one of the seller's products.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the product does not exist.
    /// - `Forbidden` when it belongs to another seller.
    #[instrument(skip(self), fields(seller = %seller, product_id = %product_id))]
    pub async fn product_statistics(
        &self,
        seller: &LoginName,
        product_id: ProductId,
    ) -> Result<ProductStatistics, ServiceError> {
        self.try_product_statistics(seller, product_id)
            .await
            .inspect_err(|e| log_failure("computeProductStatistics", e))
    }

    async fn try_product_statistics(
        &self,
        seller: &LoginName,
        product_id: ProductId,
    ) -> Result<ProductStatistics, ServiceError> {
        let product = CatalogRepository::new(self.storage.pool())
            .get(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product not found"))?;
        if &product.seller_login_name != seller {
            return Err(DomainError::Forbidden(
                "You can only view statistics for your own products".to_string(),
            )
            .into());
        }

        let records = StatisticsRepository::new(self.storage.pool())
            .sales_for_product(product_id)
            .await?;
        Ok(aggregate(records))
    }
}
