//! Catalog types: products, variants, images and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{CommentId, ImageId, LoginName, ProductId};

/// A product row without its children.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: ProductId,
    pub seller_login_name: LoginName,
    pub name: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub created_at: DateTime<Utc>,
}

/// A purchasable variant (SKU) of a product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub product_id: ProductId,
    pub variant_name: String,
    pub price: i32,
    pub in_stock_number: i32,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub image_id: ImageId,
    pub product_id: ProductId,
    pub variant_name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: CommentId,
    pub variant_name: String,
    pub author_login_name: LoginName,
    pub content: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}

/// Product with its variants, as shown in listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<Variant>,
}

/// Product detail page payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<Variant>,
    pub images: Vec<Image>,
    pub comments: Vec<Comment>,
}

/// Variant fields supplied by a seller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    pub variant_name: String,
    pub price: i32,
    pub in_stock_number: i32,
}

/// `POST /seller/products` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub brand: String,
    pub variants: Vec<VariantInput>,
}

/// `PUT /seller/products/{id}` body. Absent fields are left as-is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
}
