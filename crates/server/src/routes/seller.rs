//! Seller handlers (`/seller`): own catalog, earnings and statistics.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use bazaar_core::ProductId;
use bazaar_core::statistics::ProductStatistics;

use super::extract::{Json, Path};
use crate::error::Result;
use crate::middleware::RequireSeller;
use crate::models::catalog::{
    NewProduct, Product, ProductSummary, ProductUpdate, Variant, VariantInput,
};
use crate::models::user::SellerEarnings;
use crate::services::accounts::AccountService;
use crate::services::catalog::CatalogService;
use crate::services::statistics::StatisticsService;
use crate::state::AppState;

/// `GET /seller/products`
#[instrument(skip(state, seller), fields(seller = %seller.login_name))]
pub async fn list_products(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
) -> Result<Json<Vec<ProductSummary>>> {
    let products = CatalogService::new(state.storage(seller.role))
        .list_own(&seller.login_name)
        .await?;
    Ok(Json(products))
}

/// `GET /seller/products/{id}`
#[instrument(skip(state, seller), fields(seller = %seller.login_name))]
pub async fn show_product(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = CatalogService::new(state.storage(seller.role))
        .get_own(&seller.login_name, id)
        .await?;
    Ok(Json(product))
}

/// `POST /seller/products`
#[instrument(skip(state, seller, body), fields(seller = %seller.login_name))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductSummary>)> {
    let product = CatalogService::new(state.storage(seller.role))
        .create_product(&seller.login_name, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /seller/products/{id}`
#[instrument(skip(state, seller, body), fields(seller = %seller.login_name))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    let product = CatalogService::new(state.storage(seller.role))
        .update_product(&seller.login_name, id, &body)
        .await?;
    Ok(Json(product))
}

/// `DELETE /seller/products/{id}`
#[instrument(skip(state, seller), fields(seller = %seller.login_name))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    CatalogService::new(state.storage(seller.role))
        .delete_product(&seller.login_name, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /seller/products/{id}/variants`
#[instrument(skip(state, seller, body), fields(seller = %seller.login_name))]
pub async fn upsert_variant(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<ProductId>,
    Json(body): Json<VariantInput>,
) -> Result<Json<Variant>> {
    let variant = CatalogService::new(state.storage(seller.role))
        .upsert_variant(&seller.login_name, id, &body)
        .await?;
    Ok(Json(variant))
}

/// `GET /seller/products/{id}/statistics`
#[instrument(skip(state, seller), fields(seller = %seller.login_name))]
pub async fn product_statistics(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductStatistics>> {
    let stats = StatisticsService::new(state.storage(seller.role))
        .product_statistics(&seller.login_name, id)
        .await?;
    Ok(Json(stats))
}

/// `GET /seller/earnings`
#[instrument(skip(state, seller), fields(seller = %seller.login_name))]
pub async fn earnings(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
) -> Result<Json<SellerEarnings>> {
    let earnings = AccountService::new(state.storage(seller.role))
        .seller_earnings(&seller.login_name)
        .await?;
    Ok(Json(earnings))
}
