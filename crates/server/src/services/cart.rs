//! Cart Manager.
//!
//! Each mutation runs in its own transaction that first locks the buyer's
//! `cart` row. Two concurrent additions to the same cart therefore run one
//! after the other, and the second sees the quantity committed by the first.

use tracing::instrument;

use bazaar_core::cart::{check_add, check_set, ensure_positive, sku_not_found};
use bazaar_core::{DomainError, LoginName, ProductId};

use super::{ServiceError, log_failure};
use crate::db::{CartRepository, StorageContext};
use crate::models::cart::{Cart, CartLine};

/// Cart operations for one buyer request.
pub struct CartService<'a> {
    storage: StorageContext<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(storage: StorageContext<'a>) -> Self {
        Self { storage }
    }

    /// Add `quantity` units of a variant to the buyer's cart.
    ///
    /// Increments an existing line or inserts a new one, and returns the line
    /// as stored after the change.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the buyer has no cart or the variant does not exist.
    /// - `InvalidArgument` on overflow or insufficient stock. Nothing changes.
    #[instrument(skip(self), fields(buyer = %buyer, product_id = %product_id))]
    pub async fn add_line(
        &self,
        buyer: &LoginName,
        product_id: ProductId,
        variant_name: &str,
        quantity: i32,
    ) -> Result<CartLine, ServiceError> {
        self.try_add_line(buyer, product_id, variant_name, quantity)
            .await
            .inspect_err(|e| log_failure("addLine", e))
    }

    async fn try_add_line(
        &self,
        buyer: &LoginName,
        product_id: ProductId,
        variant_name: &str,
        quantity: i32,
    ) -> Result<CartLine, ServiceError> {
        ensure_positive(quantity)?;

        let mut tx = self.storage.begin().await?;
        let cart_id = CartRepository::lock_cart(&mut tx, buyer)
            .await?
            .ok_or_else(|| DomainError::not_found("Cart not found"))?;
        let variant = CartRepository::variant_stock(&mut tx, product_id, variant_name)
            .await?
            .ok_or_else(|| sku_not_found(product_id, variant_name))?;
        let existing =
            CartRepository::line_quantity(&mut tx, cart_id, product_id, variant_name).await?;

        let new_quantity = check_add(quantity, existing, variant)?;
        let line =
            CartRepository::put_line(&mut tx, cart_id, product_id, variant_name, new_quantity)
                .await?;
        tx.commit().await?;

        tracing::debug!(quantity = line.quantity, "Cart line stored");
        Ok(line)
    }

    /// Overwrite the quantity of an existing line.
    ///
    /// The new quantity is re-checked against the variant's current price
    /// and stock.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the cart, the variant or the line is missing.
    /// - `InvalidArgument` when the quantity is not positive, overflows, or
    ///   exceeds stock.
    #[instrument(skip(self), fields(buyer = %buyer, product_id = %product_id))]
    pub async fn set_line_quantity(
        &self,
        buyer: &LoginName,
        product_id: ProductId,
        variant_name: &str,
        quantity: i32,
    ) -> Result<CartLine, ServiceError> {
        self.try_set_line_quantity(buyer, product_id, variant_name, quantity)
            .await
            .inspect_err(|e| log_failure("setLineQuantity", e))
    }

    async fn try_set_line_quantity(
        &self,
        buyer: &LoginName,
        product_id: ProductId,
        variant_name: &str,
        quantity: i32,
    ) -> Result<CartLine, ServiceError> {
        ensure_positive(quantity)?;

        let mut tx = self.storage.begin().await?;
        let cart_id = CartRepository::lock_cart(&mut tx, buyer)
            .await?
            .ok_or_else(|| DomainError::not_found("Cart not found"))?;
        if CartRepository::line_quantity(&mut tx, cart_id, product_id, variant_name)
            .await?
            .is_none()
        {
            return Err(DomainError::not_found("Item not in cart").into());
        }
        let variant = CartRepository::variant_stock(&mut tx, product_id, variant_name)
            .await?
            .ok_or_else(|| sku_not_found(product_id, variant_name))?;

        check_set(quantity, variant)?;
        let line =
            CartRepository::put_line(&mut tx, cart_id, product_id, variant_name, quantity).await?;
        tx.commit().await?;
        Ok(line)
    }

    /// Remove a line from the buyer's cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the buyer has no cart or the line is absent.
    #[instrument(skip(self), fields(buyer = %buyer, product_id = %product_id))]
    pub async fn remove_line(
        &self,
        buyer: &LoginName,
        product_id: ProductId,
        variant_name: &str,
    ) -> Result<(), ServiceError> {
        let removed = CartRepository::new(self.storage.pool())
            .remove_line(buyer, product_id, variant_name)
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("removeLine", e))?;

        if !removed {
            let err: ServiceError =
                DomainError::not_found("Cart not found or item not in cart").into();
            log_failure("removeLine", &err);
            return Err(err);
        }
        Ok(())
    }

    /// Read the buyer's cart.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if the read fails.
    #[instrument(skip(self), fields(buyer = %buyer))]
    pub async fn read_cart(&self, buyer: &LoginName) -> Result<Option<Cart>, ServiceError> {
        CartRepository::new(self.storage.pool())
            .read(buyer)
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("readCart", e))
    }
}
