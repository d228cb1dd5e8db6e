//! Order Workflow against a real database.
//!
//! Run with: `cargo test -p bazaar-integration-tests -- --include-ignored`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use bazaar_core::order::OrderItem;
use bazaar_core::{AddressId, DELIVERY_PRICE, DomainError, LoginName, OrderId, ProductId, Role};
use bazaar_integration_tests::{
    create_account, create_address, create_product, money_spent, offline_pools, stock_of,
    test_pools, unique_login,
};
use bazaar_server::models::CurrentUser;
use bazaar_server::models::order::CreateOrderRequest;
use bazaar_server::services::ServiceError;
use bazaar_server::services::accounts::AccountService;
use bazaar_server::services::cart::CartService;
use bazaar_server::services::orders::OrderService;

fn item(product_id: ProductId, variant_name: &str, quantity: i32) -> OrderItem {
    OrderItem {
        product_id,
        variant_name: variant_name.to_string(),
        quantity,
    }
}

fn request(skus: Vec<OrderItem>, address_id: AddressId) -> CreateOrderRequest {
    CreateOrderRequest {
        skus,
        address_id,
        provider_name: "MoMo".to_string(),
        account_id: Some("0900000000".to_string()),
        delivery_method_name: "Express".to_string(),
        delivery_provider_name: "GrabExpress".to_string(),
    }
}

fn buyer_of(login_name: &LoginName) -> CurrentUser {
    CurrentUser {
        login_name: login_name.clone(),
        role: Role::Buyer,
    }
}

// =============================================================================
// Validation (no database)
// =============================================================================

#[tokio::test]
async fn test_empty_order_is_invalid() {
    let pools = offline_pools().unwrap();
    let orders = OrderService::new(pools.for_role(Role::Buyer));

    let err = orders
        .create_order(&unique_login("buyer"), &request(vec![], AddressId::new(1)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_zero_quantity_item_is_invalid() {
    let pools = offline_pools().unwrap();
    let orders = OrderService::new(pools.for_role(Role::Buyer));

    let err = orders
        .create_order(
            &unique_login("buyer"),
            &request(vec![item(ProductId::new(1), "Red", 0)], AddressId::new(1)),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::InvalidArgument(_))
    ));
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_order_splits_by_seller_and_moves_money() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller_a = create_account(pool, "seller", Role::Seller).await.unwrap();
    let seller_b = create_account(pool, "seller", Role::Seller).await.unwrap();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let address = create_address(pool, &buyer).await.unwrap();
    let lamp = create_product(pool, &seller_a, &[("Natural", 1500, 10)]).await.unwrap();
    let mug = create_product(pool, &seller_b, &[("Blue", 700, 3), ("Green", 800, 3)])
        .await
        .unwrap();

    let cart = CartService::new(pools.for_role(Role::Buyer));
    cart.add_line(&buyer, lamp, "Natural", 2).await.unwrap();
    cart.add_line(&buyer, mug, "Green", 1).await.unwrap();

    let orders = OrderService::new(pools.for_role(Role::Buyer));
    let order = orders
        .create_order(
            &buyer,
            &request(
                vec![
                    item(lamp, "Natural", 2),
                    item(mug, "Blue", 1),
                    item(mug, "Blue", 1),
                ],
                address,
            ),
        )
        .await
        .unwrap();

    // 2 x 1500 + 2 x 700, delivery excluded
    assert_eq!(order.order.total_price, 4400);
    assert_eq!(order.sub_orders.len(), 2);
    let sku_sum: i64 = order
        .sub_orders
        .iter()
        .map(|s| s.sub_order.total_sku_price)
        .sum();
    assert_eq!(sku_sum, order.order.total_price);
    for view in &order.sub_orders {
        assert_eq!(view.sub_order.delivery_price, DELIVERY_PRICE);
        let actual = view.sub_order.actual_date.unwrap();
        let expected = view.sub_order.expected_date.unwrap();
        assert_eq!((expected - actual).num_days(), 2);
    }

    assert_eq!(stock_of(pool, lamp, "Natural").await.unwrap(), 8);
    assert_eq!(stock_of(pool, mug, "Blue").await.unwrap(), 1);
    assert_eq!(stock_of(pool, mug, "Green").await.unwrap(), 3);

    let accounts = AccountService::new(pools.for_role(Role::Seller));
    let earned_a = accounts.seller_earnings(&seller_a).await.unwrap().earnings;
    let earned_b = accounts.seller_earnings(&seller_b).await.unwrap().earnings;
    assert_eq!(earned_a, 3000);
    assert_eq!(earned_b, 1400);
    assert_eq!(earned_a + earned_b, order.order.total_price);
    assert_eq!(money_spent(pool, &buyer).await.unwrap(), 4400);

    // Purchased lines leave the cart, others stay
    let contents = cart.read_cart(&buyer).await.unwrap().unwrap();
    assert_eq!(contents.items.len(), 1);
    assert_eq!(contents.items[0].product_id, mug);
    assert_eq!(contents.items[0].variant_name, "Green");

    let listed = orders.list_orders(&buyer).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].order_id, order.order.order_id);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_invalid_delivery_provider_rolls_back_everything() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let address = create_address(pool, &buyer).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 1000, 5)]).await.unwrap();

    let cart = CartService::new(pools.for_role(Role::Buyer));
    cart.add_line(&buyer, product, "Red", 2).await.unwrap();

    let mut bad = request(vec![item(product, "Red", 2)], address);
    bad.delivery_provider_name = "Carrier Pigeon".to_string();

    let orders = OrderService::new(pools.for_role(Role::Buyer));
    let err = orders.create_order(&buyer, &bad).await.unwrap_err();
    match err {
        ServiceError::InvalidChoice { choices, .. } => assert!(choices.contains(&"VNPost")),
        other => panic!("expected InvalidChoice, got {other:?}"),
    }

    assert_eq!(stock_of(pool, product, "Red").await.unwrap(), 5);
    assert_eq!(money_spent(pool, &buyer).await.unwrap(), 0);
    let earned = AccountService::new(pools.for_role(Role::Seller))
        .seller_earnings(&seller)
        .await
        .unwrap()
        .earnings;
    assert_eq!(earned, 0);
    assert!(orders.list_orders(&buyer).await.unwrap().is_empty());
    let contents = cart.read_cart(&buyer).await.unwrap().unwrap();
    assert_eq!(contents.items[0].quantity, 2);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_order_beyond_stock_is_invalid_and_changes_nothing() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let address = create_address(pool, &buyer).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 1000, 2)]).await.unwrap();

    let orders = OrderService::new(pools.for_role(Role::Buyer));
    let err = orders
        .create_order(&buyer, &request(vec![item(product, "Red", 3)], address))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::InvalidArgument(_))
    ));
    assert_eq!(stock_of(pool, product, "Red").await.unwrap(), 2);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_order_with_unknown_sku_is_not_found() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let address = create_address(pool, &buyer).await.unwrap();

    let err = OrderService::new(pools.for_role(Role::Buyer))
        .create_order(
            &buyer,
            &request(vec![item(ProductId::new(i32::MAX), "Red", 1)], address),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));
    assert!(err.to_string().starts_with("SKU not found"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_order_to_another_buyers_address_is_invalid() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let owner = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let other = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let owners_address = create_address(pool, &owner).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 1000, 5)]).await.unwrap();

    let orders = OrderService::new(pools.for_role(Role::Buyer));
    let err = orders
        .create_order(&other, &request(vec![item(product, "Red", 1)], owners_address))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::InvalidArgument(_))
    ));
    assert_eq!(err.to_string(), "Invalid AddressID: address does not exist");
    assert_eq!(stock_of(pool, product, "Red").await.unwrap(), 5);
    assert_eq!(money_spent(pool, &other).await.unwrap(), 0);
    assert!(orders.list_orders(&other).await.unwrap().is_empty());
}

// =============================================================================
// Reading
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_order_details_visibility() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let stranger = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let address = create_address(pool, &buyer).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 1000, 5)]).await.unwrap();

    let orders = OrderService::new(pools.for_role(Role::Buyer));
    let created = orders
        .create_order(&buyer, &request(vec![item(product, "Red", 1)], address))
        .await
        .unwrap();
    let id = created.order.order_id;

    let own = orders.read_order_details(&buyer_of(&buyer), id).await.unwrap();
    assert_eq!(own.sub_orders[0].details[0].quantity, 1);
    assert_eq!(own.address.unwrap().address_id, address);

    let admin = CurrentUser {
        login_name: unique_login("admin"),
        role: Role::Admin,
    };
    assert!(
        OrderService::new(pools.for_role(Role::Admin))
            .read_order_details(&admin, id)
            .await
            .is_ok()
    );

    for caller in [
        buyer_of(&stranger),
        CurrentUser {
            login_name: seller.clone(),
            role: Role::Seller,
        },
    ] {
        let err = orders.read_order_details(&caller, id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_missing_order_is_not_found() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();

    let err = OrderService::new(pools.for_role(Role::Buyer))
        .read_order_details(&buyer_of(&buyer), OrderId::new(i32::MAX))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));
}
