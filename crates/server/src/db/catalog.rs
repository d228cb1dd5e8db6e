//! Catalog repository: public product listings and the seller's own catalog.
//!
//! Seller operations always filter on `seller_login_name`, so touching another
//! seller's product looks exactly like touching a missing one.

use std::collections::BTreeMap;

use sqlx::{PgConnection, PgPool};

use bazaar_core::{LoginName, ProductId};

use super::RepositoryError;
use crate::models::catalog::{
    Comment, Image, NewProduct, Product, ProductDetail, ProductSummary, ProductUpdate, Variant,
    VariantInput,
};

const PRODUCT_COLUMNS: &str =
    "product_id, seller_login_name, name, description, category, brand, created_at";

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products with their variants, newest first.
    ///
    /// `search` matches name, brand or category case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<ProductSummary>, RepositoryError> {
        let pattern = search.map(|s| format!("%{}%", escape_like(s)));
        let products: Vec<Product> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM bazaar.product
             WHERE $1::text IS NULL
                OR name ILIKE $1 OR brand ILIKE $1 OR category ILIKE $1
             ORDER BY created_at DESC, product_id DESC"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        self.with_variants(products).await
    }

    /// List one seller's products with their variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_seller(
        &self,
        seller: &LoginName,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let products: Vec<Product> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM bazaar.product
             WHERE seller_login_name = $1
             ORDER BY created_at DESC, product_id DESC"
        ))
        .bind(seller)
        .fetch_all(self.pool)
        .await?;

        self.with_variants(products).await
    }

    async fn with_variants(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let ids: Vec<i32> = products.iter().map(|p| p.product_id.as_i32()).collect();
        let variants: Vec<Variant> = sqlx::query_as(
            "SELECT product_id, variant_name, price, in_stock_number
             FROM bazaar.variant
             WHERE product_id = ANY($1)
             ORDER BY product_id, variant_name",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_product: BTreeMap<ProductId, Vec<Variant>> = BTreeMap::new();
        for variant in variants {
            by_product.entry(variant.product_id).or_default().push(variant);
        }

        Ok(products
            .into_iter()
            .map(|product| ProductSummary {
                variants: by_product.remove(&product.product_id).unwrap_or_default(),
                product,
            })
            .collect())
    }

    /// Get a product row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM bazaar.product WHERE product_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Get a product with variants, images and comments.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let Some(product) = self.get(id).await? else {
            return Ok(None);
        };

        let variants: Vec<Variant> = sqlx::query_as(
            "SELECT product_id, variant_name, price, in_stock_number
             FROM bazaar.variant WHERE product_id = $1 ORDER BY variant_name",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let images: Vec<Image> = sqlx::query_as(
            "SELECT image_id, product_id, variant_name, url
             FROM bazaar.image WHERE product_id = $1 ORDER BY image_id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let comments: Vec<Comment> = sqlx::query_as(
            "SELECT comment_id, variant_name, author_login_name, content, rating, created_at
             FROM bazaar.comment WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(ProductDetail {
            product,
            variants,
            images,
            comments,
        }))
    }

    /// Get a product only if it belongs to `seller`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_owned(
        &self,
        seller: &LoginName,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM bazaar.product
             WHERE product_id = $1 AND seller_login_name = $2"
        ))
        .bind(id)
        .bind(seller)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Create a product and its variants in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate variant name.
    /// Returns `RepositoryError::CheckViolation` on a non-positive price or negative stock.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        seller: &LoginName,
        input: &NewProduct,
    ) -> Result<ProductSummary, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product: Product = sqlx::query_as(&format!(
            "INSERT INTO bazaar.product (seller_login_name, name, description, category, brand)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(seller)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.brand)
        .fetch_one(&mut *tx)
        .await?;

        let mut variants = Vec::with_capacity(input.variants.len());
        for variant in &input.variants {
            variants.push(Self::upsert_variant_in(&mut tx, product.product_id, variant).await?);
        }

        tx.commit().await?;
        Ok(ProductSummary { product, variants })
    }

    /// Update a seller's product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the seller has no such product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        seller: &LoginName,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as(&format!(
            "UPDATE bazaar.product SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                category = COALESCE($5, category),
                brand = COALESCE($6, brand)
             WHERE product_id = $1 AND seller_login_name = $2
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(seller)
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.category.as_deref())
        .bind(update.brand.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Delete a seller's product (variants, images and cart lines cascade).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the seller has no such product.
    /// Returns `RepositoryError::ForeignKey` if the product has been ordered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, seller: &LoginName, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM bazaar.product WHERE product_id = $1 AND seller_login_name = $2",
        )
        .bind(id)
        .bind(seller)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert a variant of a seller's product, or replace its price and stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the seller has no such product.
    /// Returns `RepositoryError::CheckViolation` on a non-positive price or negative stock.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert_variant(
        &self,
        seller: &LoginName,
        id: ProductId,
        input: &VariantInput,
    ) -> Result<Variant, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<i32> = sqlx::query_scalar(
            "SELECT product_id FROM bazaar.product
             WHERE product_id = $1 AND seller_login_name = $2
             FOR UPDATE",
        )
        .bind(id)
        .bind(seller)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let variant = Self::upsert_variant_in(&mut tx, id, input).await?;
        tx.commit().await?;
        Ok(variant)
    }

    async fn upsert_variant_in(
        conn: &mut PgConnection,
        id: ProductId,
        input: &VariantInput,
    ) -> Result<Variant, RepositoryError> {
        let variant = sqlx::query_as(
            "INSERT INTO bazaar.variant (product_id, variant_name, price, in_stock_number)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (product_id, variant_name)
             DO UPDATE SET price = EXCLUDED.price, in_stock_number = EXCLUDED.in_stock_number
             RETURNING product_id, variant_name, price, in_stock_number",
        )
        .bind(id)
        .bind(&input.variant_name)
        .bind(input.price)
        .bind(input.in_stock_number)
        .fetch_one(conn)
        .await?;
        Ok(variant)
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
