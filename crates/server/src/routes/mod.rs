//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                           - Liveness
//! GET    /health/ready                     - Readiness (database ping)
//!
//! # Auth
//! POST   /auth/login                       - Issue a bearer token (rate limited)
//! GET    /auth/profile                     - Caller's account and totals
//!
//! # Buyers
//! GET    /buyers/products[?search=]        - Product listing
//! GET    /buyers/products/{id}             - Product detail
//! GET    /buyers/cart                      - Cart contents
//! POST   /buyers/cart                      - Add to a line
//! PUT    /buyers/cart                      - Set a line's quantity
//! DELETE /buyers/cart                      - Remove a line
//! POST   /buyers/order/create              - Place an order
//! GET    /buyers/order                     - Order history
//! GET    /buyers/order/{id}                - Order details (buyer or admin)
//!
//! # Sellers
//! GET    /seller/products                  - Own products
//! POST   /seller/products                  - Create a product
//! GET    /seller/products/{id}             - Own product
//! PUT    /seller/products/{id}             - Update a product
//! DELETE /seller/products/{id}             - Delete a product
//! POST   /seller/products/{id}/variants    - Add or replace a variant
//! GET    /seller/products/{id}/statistics  - Monthly/daily sales
//! GET    /seller/earnings                  - Accumulated earnings
//!
//! # Admin
//! GET    /admin/users[?role=]              - Account listing
//! PUT    /admin/users/{loginName}          - Update an account
//! GET    /admin/stats                      - Platform totals
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod extract;
pub mod health;
pub mod orders;
pub mod products;
pub mod seller;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login).layer(login_rate_limiter()))
        .route("/profile", get(auth::profile))
}

/// Create the buyer routes router.
pub fn buyer_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route(
            "/cart",
            get(cart::show)
                .post(cart::add)
                .put(cart::update)
                .delete(cart::remove),
        )
        .route("/order", get(orders::index))
        .route("/order/create", post(orders::create))
        .route("/order/{id}", get(orders::show))
}

/// Create the seller routes router.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(seller::list_products).post(seller::create_product),
        )
        .route(
            "/products/{id}",
            get(seller::show_product)
                .put(seller::update_product)
                .delete(seller::delete_product),
        )
        .route("/products/{id}/variants", post(seller::upsert_variant))
        .route("/products/{id}/statistics", get(seller::product_statistics))
        .route("/earnings", get(seller::earnings))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{login_name}", put(admin::update_user))
        .route("/stats", get(admin::platform_stats))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes())
        .nest("/buyers", buyer_routes())
        .nest("/seller", seller_routes())
        .nest("/admin", admin_routes())
}
