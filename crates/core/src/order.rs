//! Order planning.
//!
//! Turns the buyer's requested items plus the variants read (and locked) by
//! the order service into an [`OrderPlan`]: one sub-order per seller, with
//! per-line snapshots and checked totals. Nothing here touches storage, so the
//! service can persist the plan verbatim or drop the transaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cart::sku_not_found;
use crate::error::DomainError;
use crate::types::{LoginName, ProductId};

/// One requested `(product, variant, quantity)` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(alias = "ProductID")]
    pub product_id: ProductId,
    #[serde(alias = "VariantName")]
    pub variant_name: String,
    #[serde(alias = "Quantity")]
    pub quantity: i32,
}

/// A variant as read inside the order transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    pub product_id: ProductId,
    pub variant_name: String,
    pub seller: LoginName,
    pub price: i32,
    pub in_stock: i32,
}

/// A line of a sub-order with the price validated at planning time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub product_id: ProductId,
    pub variant_name: String,
    pub quantity: i32,
    pub unit_price: i32,
    pub item_total: i64,
}

/// Everything one seller ships for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerPlan {
    pub seller: LoginName,
    pub lines: Vec<PlannedLine>,
    /// Sum of `item_total` over `lines`.
    pub total_sku_price: i64,
}

/// The validated shape of an order, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    /// Sub-orders sorted by seller login name.
    pub sub_orders: Vec<SellerPlan>,
    /// Sum of all sub-order `total_sku_price` values.
    pub total_price: i64,
}

impl OrderPlan {
    /// Amount to credit to each seller's running earnings.
    pub fn seller_credits(&self) -> impl Iterator<Item = (&LoginName, i64)> {
        self.sub_orders
            .iter()
            .map(|sub| (&sub.seller, sub.total_sku_price))
    }

    /// Every `(product, variant, quantity)` consumed by the order.
    pub fn purchased(&self) -> impl Iterator<Item = &PlannedLine> {
        self.sub_orders.iter().flat_map(|sub| sub.lines.iter())
    }
}

fn total_overflow() -> DomainError {
    DomainError::invalid("Order total exceeds the maximum supported amount")
}

/// Validate the raw item list and merge duplicates.
///
/// Items are returned sorted by `(product_id, variant_name)`, which is also
/// the order in which the service locks variant rows.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` when the list is empty or any item
/// has a non-positive quantity.
pub fn normalize_items(items: &[OrderItem]) -> Result<Vec<OrderItem>, DomainError> {
    if items.is_empty() {
        return Err(DomainError::invalid(
            "Invalid order: skus must be a non-empty array",
        ));
    }

    let mut merged: BTreeMap<(ProductId, &str), i32> = BTreeMap::new();
    for item in items {
        if item.quantity < 1 {
            return Err(DomainError::invalid(format!(
                "Invalid order: quantity for ProductID={}, VariantName={} must be positive",
                item.product_id, item.variant_name
            )));
        }
        let held = merged
            .entry((item.product_id, item.variant_name.as_str()))
            .or_insert(0);
        *held = held.checked_add(item.quantity).ok_or_else(total_overflow)?;
    }

    Ok(merged
        .into_iter()
        .map(|((product_id, variant_name), quantity)| OrderItem {
            product_id,
            variant_name: variant_name.to_owned(),
            quantity,
        })
        .collect())
}

/// Build an order plan from normalized items and the variants they resolve to.
///
/// # Errors
///
/// - `DomainError::NotFound` when an item has no matching variant.
/// - `DomainError::InvalidArgument` when an item exceeds stock or a total overflows.
pub fn plan_order(
    items: &[OrderItem],
    variants: &[ResolvedVariant],
) -> Result<OrderPlan, DomainError> {
    let by_key: BTreeMap<(ProductId, &str), &ResolvedVariant> = variants
        .iter()
        .map(|v| ((v.product_id, v.variant_name.as_str()), v))
        .collect();

    let mut sellers: BTreeMap<LoginName, SellerPlan> = BTreeMap::new();
    let mut total_price: i64 = 0;

    for item in items {
        let variant = by_key
            .get(&(item.product_id, item.variant_name.as_str()))
            .ok_or_else(|| sku_not_found(item.product_id, &item.variant_name))?;

        if item.quantity > variant.in_stock {
            return Err(DomainError::invalid(format!(
                "Insufficient stock for ProductID={}, VariantName={}. Available: {}",
                item.product_id, item.variant_name, variant.in_stock
            )));
        }

        let item_total = i64::from(variant.price)
            .checked_mul(i64::from(item.quantity))
            .ok_or_else(total_overflow)?;
        total_price = total_price
            .checked_add(item_total)
            .ok_or_else(total_overflow)?;

        let plan = sellers
            .entry(variant.seller.clone())
            .or_insert_with(|| SellerPlan {
                seller: variant.seller.clone(),
                lines: Vec::new(),
                total_sku_price: 0,
            });
        plan.total_sku_price += item_total;
        plan.lines.push(PlannedLine {
            product_id: item.product_id,
            variant_name: item.variant_name.clone(),
            quantity: item.quantity,
            unit_price: variant.price,
            item_total,
        });
    }

    Ok(OrderPlan {
        sub_orders: sellers.into_values().collect(),
        total_price,
    })
}
