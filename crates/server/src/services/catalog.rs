//! Catalog service: public browsing and seller-owned product management.

use tracing::instrument;

use bazaar_core::{DomainError, LoginName, ProductId};

use super::{ServiceError, log_failure};
use crate::db::{CatalogRepository, RepositoryError, StorageContext};
use crate::models::catalog::{
    NewProduct, Product, ProductDetail, ProductSummary, ProductUpdate, Variant, VariantInput,
};

pub struct CatalogService<'a> {
    storage: StorageContext<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(storage: StorageContext<'a>) -> Self {
        Self { storage }
    }

    fn repo(&self) -> CatalogRepository<'a> {
        CatalogRepository::new(self.storage.pool())
    }

    /// List products, optionally filtered by a search term.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if the read fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<ProductSummary>, ServiceError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repo()
            .list(search)
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("listProducts", e))
    }

    /// Product detail with variants, images and comments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<ProductDetail, ServiceError> {
        self.repo()
            .get_detail(id)
            .await
            .map_err(ServiceError::from)
            .and_then(|p| p.ok_or_else(|| product_not_found().into()))
            .inspect_err(|e| log_failure("getProduct", e))
    }

    /// The seller's own products.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if the read fails.
    #[instrument(skip(self), fields(seller = %seller))]
    pub async fn list_own(&self, seller: &LoginName) -> Result<Vec<ProductSummary>, ServiceError> {
        self.repo()
            .list_by_seller(seller)
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("listOwnProducts", e))
    }

    /// One of the seller's own products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the seller has no such product.
    #[instrument(skip(self), fields(seller = %seller, product_id = %id))]
    pub async fn get_own(&self, seller: &LoginName, id: ProductId) -> Result<Product, ServiceError> {
        self.repo()
            .get_owned(seller, id)
            .await
            .map_err(ServiceError::from)
            .and_then(|p| p.ok_or_else(|| product_not_found().into()))
            .inspect_err(|e| log_failure("getOwnProduct", e))
    }

    /// Create a product with at least one variant.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for blank names, no variants, or bad price/stock.
    /// - `Conflict` for duplicate variant names.
    #[instrument(skip(self, input), fields(seller = %seller, name = %input.name))]
    pub async fn create_product(
        &self,
        seller: &LoginName,
        input: &NewProduct,
    ) -> Result<ProductSummary, ServiceError> {
        validate_new_product(input)
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("createProduct", e))?;

        self.repo()
            .create(seller, input)
            .await
            .map_err(map_write_error)
            .inspect_err(|e| log_failure("createProduct", e))
    }

    /// Update fields of one of the seller's products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the seller has no such product.
    #[instrument(skip(self, update), fields(seller = %seller, product_id = %id))]
    pub async fn update_product(
        &self,
        seller: &LoginName,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, ServiceError> {
        self.repo()
            .update(seller, id, update)
            .await
            .map_err(map_write_error)
            .inspect_err(|e| log_failure("updateProduct", e))
    }

    /// Delete one of the seller's products.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the seller has no such product.
    /// - `InvalidArgument` when the product has already been ordered.
    #[instrument(skip(self), fields(seller = %seller, product_id = %id))]
    pub async fn delete_product(&self, seller: &LoginName, id: ProductId) -> Result<(), ServiceError> {
        self.repo()
            .delete(seller, id)
            .await
            .map_err(|e| match e {
                RepositoryError::ForeignKey { .. } => {
                    DomainError::invalid("Product has been ordered and cannot be deleted").into()
                }
                other => map_write_error(other),
            })
            .inspect_err(|e| log_failure("deleteProduct", e))
    }

    /// Add a variant to one of the seller's products, or replace its price and stock.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a blank name or bad price/stock.
    /// - `NotFound` when the seller has no such product.
    #[instrument(skip(self, input), fields(seller = %seller, product_id = %id))]
    pub async fn upsert_variant(
        &self,
        seller: &LoginName,
        id: ProductId,
        input: &VariantInput,
    ) -> Result<Variant, ServiceError> {
        validate_variant(input)
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("upsertVariant", e))?;

        self.repo()
            .upsert_variant(seller, id, input)
            .await
            .map_err(map_write_error)
            .inspect_err(|e| log_failure("upsertVariant", e))
    }
}

fn product_not_found() -> DomainError {
    DomainError::not_found("Product not found")
}

/// Seller writes: a missing row is a missing product; check violations are
/// bad input.
fn map_write_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => product_not_found().into(),
        RepositoryError::CheckViolation { constraint } => {
            DomainError::invalid(format!("Invalid product data ({constraint})")).into()
        }
        other => other.into(),
    }
}

fn validate_new_product(input: &NewProduct) -> Result<(), DomainError> {
    if input.name.trim().is_empty() {
        return Err(DomainError::invalid("Product name must not be empty"));
    }
    if input.category.trim().is_empty() {
        return Err(DomainError::invalid("Product category must not be empty"));
    }
    if input.variants.is_empty() {
        return Err(DomainError::invalid("A product needs at least one variant"));
    }
    input.variants.iter().try_for_each(validate_variant)
}

fn validate_variant(input: &VariantInput) -> Result<(), DomainError> {
    if input.variant_name.trim().is_empty() {
        return Err(DomainError::invalid("Variant name must not be empty"));
    }
    if input.price < 1 {
        return Err(DomainError::invalid("Price must be a positive integer"));
    }
    if input.in_stock_number < 0 {
        return Err(DomainError::invalid("Stock must not be negative"));
    }
    Ok(())
}
