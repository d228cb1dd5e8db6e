//! Buyer order handlers (`/buyers/order`).

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use bazaar_core::OrderId;

use super::extract::{Json, Path};
use crate::error::Result;
use crate::middleware::{RequireAuth, RequireBuyer};
use crate::models::order::{CreateOrderRequest, OrderDetails, OrderSummary};
use crate::services::orders::OrderService;
use crate::state::AppState;

/// `POST /buyers/order/create`
#[instrument(skip(state, buyer, body), fields(buyer = %buyer.login_name))]
pub async fn create(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetails>)> {
    let order = OrderService::new(state.storage(buyer.role))
        .create_order(&buyer.login_name, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /buyers/order`
#[instrument(skip(state, buyer), fields(buyer = %buyer.login_name))]
pub async fn index(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderService::new(state.storage(buyer.role))
        .list_orders(&buyer.login_name)
        .await?;
    Ok(Json(orders))
}

/// `GET /buyers/order/{id}` - buyers see their own orders, admins any.
#[instrument(skip(state, caller), fields(caller = %caller.login_name))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetails>> {
    let order = OrderService::new(state.storage(caller.role))
        .read_order_details(&caller, id)
        .await?;
    Ok(Json(order))
}
