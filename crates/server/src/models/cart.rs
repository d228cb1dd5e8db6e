//! Cart types.

use serde::{Deserialize, Serialize};

use bazaar_core::{CartId, LoginName, ProductId};

/// A stored cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub cart_id: CartId,
    pub variant_name: String,
    pub quantity: i32,
}

/// A cart line joined to its variant and product for display.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub variant_name: String,
    pub quantity: i32,
    pub price: i32,
    pub in_stock_number: i32,
    pub product_name: String,
    pub brand: String,
    pub seller_login_name: LoginName,
    pub images: Vec<String>,
}

impl CartItem {
    /// Price of the line (never overflows: price and quantity are `i32`).
    #[must_use]
    pub fn line_total(&self) -> i64 {
        i64::from(self.price) * i64::from(self.quantity)
    }
}

/// `GET /buyers/cart` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub cart_id: CartId,
    pub login_name: LoginName,
    pub items: Vec<CartItem>,
    pub subtotal: i64,
}

impl Cart {
    /// Build a cart view, computing the subtotal from the lines.
    #[must_use]
    pub fn new(cart_id: CartId, login_name: LoginName, items: Vec<CartItem>) -> Self {
        let subtotal = items.iter().map(CartItem::line_total).sum();
        Self {
            cart_id,
            login_name,
            items,
            subtotal,
        }
    }
}

/// Body of every `/buyers/cart` mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub product_id: ProductId,
    pub variant_name: String,
    pub quantity: Option<i32>,
}
