//! Cart route handlers (`/buyers/cart`).
//!
//! All four verbs take the same body, `{productId, variantName, quantity?}`.
//! `quantity` defaults to 1 when adding and is required when setting.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use bazaar_core::DomainError;

use super::extract::Json;
use crate::error::{AppError, Result};
use crate::middleware::RequireBuyer;
use crate::models::cart::{Cart, CartLine, CartLineRequest};
use crate::services::cart::CartService;
use crate::state::AppState;

fn positive_quantity(quantity: i32) -> Result<i32> {
    if quantity < 1 {
        return Err(DomainError::invalid("Quantity must be a positive integer").into());
    }
    Ok(quantity)
}

/// `POST /buyers/cart` - add to a line.
#[instrument(skip(state, buyer, body), fields(buyer = %buyer.login_name))]
pub async fn add(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Json(body): Json<CartLineRequest>,
) -> Result<Json<CartLine>> {
    let quantity = positive_quantity(body.quantity.unwrap_or(1))?;
    let line = CartService::new(state.storage(buyer.role))
        .add_line(&buyer.login_name, body.product_id, &body.variant_name, quantity)
        .await?;
    Ok(Json(line))
}

/// `GET /buyers/cart`
#[instrument(skip(state, buyer), fields(buyer = %buyer.login_name))]
pub async fn show(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
) -> Result<Json<Cart>> {
    CartService::new(state.storage(buyer.role))
        .read_cart(&buyer.login_name)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))
}

/// `PUT /buyers/cart` - overwrite a line's quantity.
#[instrument(skip(state, buyer, body), fields(buyer = %buyer.login_name))]
pub async fn update(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Json(body): Json<CartLineRequest>,
) -> Result<Json<CartLine>> {
    let quantity = body
        .quantity
        .ok_or_else(|| AppError::InvalidArgument("quantity is required".to_string()))
        .and_then(positive_quantity)?;
    let line = CartService::new(state.storage(buyer.role))
        .set_line_quantity(&buyer.login_name, body.product_id, &body.variant_name, quantity)
        .await?;
    Ok(Json(line))
}

/// `DELETE /buyers/cart` - remove a line.
#[instrument(skip(state, buyer, body), fields(buyer = %buyer.login_name))]
pub async fn remove(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Json(body): Json<CartLineRequest>,
) -> Result<StatusCode> {
    CartService::new(state.storage(buyer.role))
        .remove_line(&buyer.login_name, body.product_id, &body.variant_name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
