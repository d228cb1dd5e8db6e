//! Public product browsing.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::ProductId;

use super::extract::{Json, Path, Query};
use crate::error::Result;
use crate::models::catalog::{ProductDetail, ProductSummary};
use crate::services::catalog::CatalogService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// `GET /buyers/products[?search=]`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductSummary>>> {
    let products = CatalogService::new(state.public_storage())
        .list_products(query.search.as_deref())
        .await?;
    Ok(Json(products))
}

/// `GET /buyers/products/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = CatalogService::new(state.public_storage())
        .get_product(id)
        .await?;
    Ok(Json(product))
}
