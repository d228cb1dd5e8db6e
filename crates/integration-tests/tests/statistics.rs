//! Statistics Aggregator against a real database.
//!
//! Run with: `cargo test -p bazaar-integration-tests -- --include-ignored`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::NaiveDate;

use bazaar_core::order::OrderItem;
use bazaar_core::{AddressId, DomainError, LoginName, ProductId, Role, SubOrderId};
use bazaar_integration_tests::{create_account, create_address, create_product, test_pools};
use bazaar_server::models::catalog::VariantInput;
use bazaar_server::models::order::CreateOrderRequest;
use bazaar_server::services::ServiceError;
use bazaar_server::services::catalog::CatalogService;
use bazaar_server::services::orders::OrderService;
use bazaar_server::services::statistics::StatisticsService;
use sqlx::PgPool;

async fn place_order(
    orders: &OrderService<'_>,
    buyer: &LoginName,
    address_id: AddressId,
    product_id: ProductId,
    variant_name: &str,
    quantity: i32,
) -> SubOrderId {
    let request = CreateOrderRequest {
        skus: vec![OrderItem {
            product_id,
            variant_name: variant_name.to_string(),
            quantity,
        }],
        address_id,
        provider_name: "Cash on Delivery".to_string(),
        account_id: None,
        delivery_method_name: "Standard".to_string(),
        delivery_provider_name: "VNPost".to_string(),
    };
    let order = orders.create_order(buyer, &request).await.unwrap();
    order.sub_orders[0].sub_order.sub_order_id
}

async fn backdate(pool: &PgPool, sub_order_id: SubOrderId, date: NaiveDate) {
    sqlx::query("UPDATE bazaar.sub_order SET actual_date = $2 WHERE sub_order_id = $1")
        .bind(sub_order_id)
        .bind(date)
        .execute(pool)
        .await
        .unwrap();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_same_month_different_days() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let address = create_address(pool, &buyer).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 100, 50), ("Blue", 200, 50)])
        .await
        .unwrap();

    let orders = OrderService::new(pools.for_role(Role::Buyer));
    let first = place_order(&orders, &buyer, address, product, "Red", 2).await;
    let second = place_order(&orders, &buyer, address, product, "Blue", 1).await;
    backdate(pool, first, date(2025, 3, 4)).await;
    backdate(pool, second, date(2025, 3, 19)).await;

    let stats = StatisticsService::new(pools.for_role(Role::Seller))
        .product_statistics(&seller, product)
        .await
        .unwrap();

    assert_eq!(stats.total_sold, 3);
    assert_eq!(stats.total_revenue, 400);
    assert_eq!(stats.daily_stats.len(), 2);
    assert_eq!(stats.daily_stats["2025-03-04"], 200);
    assert_eq!(stats.daily_stats["2025-03-19"], 200);
    assert_eq!(stats.monthly_stats.len(), 1);
    assert_eq!(stats.monthly_stats["2025-03"], 400);
    assert_eq!(stats.yearly_stats["2025"], 400);
    assert_eq!(stats.sku_stats["Red"].quantity, 2);
    assert_eq!(stats.sku_stats["Blue"].revenue, 200);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_revenue_uses_current_price() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let address = create_address(pool, &buyer).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 100, 50)]).await.unwrap();

    let orders = OrderService::new(pools.for_role(Role::Buyer));
    place_order(&orders, &buyer, address, product, "Red", 3).await;

    CatalogService::new(pools.for_role(Role::Seller))
        .upsert_variant(
            &seller,
            product,
            &VariantInput {
                variant_name: "Red".to_string(),
                price: 150,
                in_stock_number: 47,
            },
        )
        .await
        .unwrap();

    let stats = StatisticsService::new(pools.for_role(Role::Seller))
        .product_statistics(&seller, product)
        .await
        .unwrap();
    assert_eq!(stats.total_revenue, 450);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_unsold_product_has_empty_statistics() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 100, 5)]).await.unwrap();

    let stats = StatisticsService::new(pools.for_role(Role::Seller))
        .product_statistics(&seller, product)
        .await
        .unwrap();

    assert_eq!(stats.total_sold, 0);
    assert_eq!(stats.total_revenue, 0);
    assert!(stats.daily_stats.is_empty());
    assert!(stats.sku_stats.is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_statistics_ownership() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let owner = create_account(pool, "seller", Role::Seller).await.unwrap();
    let rival = create_account(pool, "seller", Role::Seller).await.unwrap();
    let product = create_product(pool, &owner, &[("Red", 100, 5)]).await.unwrap();
    let stats = StatisticsService::new(pools.for_role(Role::Seller));

    let err = stats.product_statistics(&rival, product).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Forbidden(_))));

    let err = stats
        .product_statistics(&owner, ProductId::new(i32::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));
}
