//! Cart line rules.
//!
//! Pure checks applied by the cart service after it has locked the cart and
//! read the variant. The first failing check wins; callers must not mutate
//! anything when a check fails.

use crate::error::DomainError;
use crate::types::ProductId;

/// Price and stock of a variant as read inside the cart transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantStock {
    /// Unit price in the smallest currency unit.
    pub price: i32,
    /// Units currently in stock.
    pub in_stock: i32,
}

/// Error for a `(product, variant)` pair that does not resolve to a variant.
#[must_use]
pub fn sku_not_found(product_id: ProductId, variant_name: &str) -> DomainError {
    DomainError::not_found(format!(
        "SKU not found: ProductID={product_id}, VariantName={variant_name}"
    ))
}

/// Largest quantity whose line total still fits in an `i32`.
#[must_use]
pub const fn max_quantity(price: i32) -> i32 {
    if price <= 0 { i32::MAX } else { i32::MAX / price }
}

/// Reject non-positive quantities.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` when `quantity < 1`.
pub fn ensure_positive(quantity: i32) -> Result<(), DomainError> {
    if quantity < 1 {
        return Err(DomainError::invalid("Quantity must be a positive integer"));
    }
    Ok(())
}

fn ensure_total_fits(quantity: i32, price: i32) -> Result<(), DomainError> {
    if quantity.checked_mul(price).is_none() {
        return Err(DomainError::invalid(format!(
            "Quantity too large. Maximum allowed: {}",
            max_quantity(price)
        )));
    }
    Ok(())
}

fn ensure_in_stock(quantity: i32, variant: VariantStock) -> Result<(), DomainError> {
    if quantity > variant.in_stock {
        return Err(DomainError::invalid(format!(
            "Insufficient stock. Available: {}",
            variant.in_stock
        )));
    }
    Ok(())
}

/// Validate adding `requested` units to a line that currently holds
/// `existing` units (or does not exist yet).
///
/// Returns the quantity the line must hold afterwards.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` when the line total would overflow,
/// when `requested` alone exceeds stock, or when `existing + requested`
/// exceeds stock.
pub fn check_add(
    requested: i32,
    existing: Option<i32>,
    variant: VariantStock,
) -> Result<i32, DomainError> {
    ensure_total_fits(requested, variant.price)?;
    ensure_in_stock(requested, variant)?;

    let Some(held) = existing else {
        return Ok(requested);
    };

    match held.checked_add(requested) {
        Some(total) if total <= variant.in_stock => Ok(total),
        _ => Err(DomainError::invalid(format!(
            "Insufficient stock. Available: {}. You already have {held} in cart.",
            variant.in_stock
        ))),
    }
}

/// Validate overwriting a line's quantity.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` when the quantity is not positive,
/// would overflow the line total, or exceeds stock.
pub fn check_set(quantity: i32, variant: VariantStock) -> Result<(), DomainError> {
    ensure_positive(quantity)?;
    ensure_total_fits(quantity, variant.price)?;
    ensure_in_stock(quantity, variant)
}
