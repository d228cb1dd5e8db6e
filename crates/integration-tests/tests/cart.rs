//! Cart Manager against a real database.
//!
//! Run with: `cargo test -p bazaar-integration-tests -- --include-ignored`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use bazaar_core::{DomainError, ProductId, Role};
use bazaar_integration_tests::{create_account, create_product, offline_pools, test_pools};
use bazaar_server::services::ServiceError;
use bazaar_server::services::cart::CartService;

fn is_invalid(err: &ServiceError) -> bool {
    matches!(err, ServiceError::Domain(DomainError::InvalidArgument(_)))
}

fn is_not_found(err: &ServiceError) -> bool {
    matches!(err, ServiceError::Domain(DomainError::NotFound(_)))
}

// =============================================================================
// Validation (no database)
// =============================================================================

#[tokio::test]
async fn test_non_positive_quantity_rejected_before_storage() {
    let pools = offline_pools().unwrap();
    let cart = CartService::new(pools.for_role(Role::Buyer));
    let buyer = bazaar_integration_tests::unique_login("buyer");

    let err = cart
        .add_line(&buyer, ProductId::new(1), "Red", 0)
        .await
        .unwrap_err();
    assert!(is_invalid(&err));

    let err = cart
        .set_line_quantity(&buyer, ProductId::new(1), "Red", -2)
        .await
        .unwrap_err();
    assert!(is_invalid(&err));
}

// =============================================================================
// Add / set / remove
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_add_line_accumulates_up_to_stock() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 1000, 5)]).await.unwrap();
    let cart = CartService::new(pools.for_role(Role::Buyer));

    let line = cart.add_line(&buyer, product, "Red", 2).await.unwrap();
    assert_eq!(line.quantity, 2);
    let line = cart.add_line(&buyer, product, "Red", 3).await.unwrap();
    assert_eq!(line.quantity, 5);

    let err = cart.add_line(&buyer, product, "Red", 1).await.unwrap_err();
    assert!(is_invalid(&err));

    let contents = cart.read_cart(&buyer).await.unwrap().unwrap();
    assert_eq!(contents.items.len(), 1);
    assert_eq!(contents.items[0].quantity, 5);
    assert_eq!(contents.subtotal, 5000);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_add_line_unknown_variant_is_not_found() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 1000, 5)]).await.unwrap();
    let cart = CartService::new(pools.for_role(Role::Buyer));

    let err = cart.add_line(&buyer, product, "Blue", 1).await.unwrap_err();
    assert!(is_not_found(&err));
    assert!(err.to_string().contains("VariantName=Blue"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_set_and_remove_line() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 1000, 4)]).await.unwrap();
    let cart = CartService::new(pools.for_role(Role::Buyer));

    let err = cart
        .set_line_quantity(&buyer, product, "Red", 1)
        .await
        .unwrap_err();
    assert!(is_not_found(&err), "setting a missing line: {err}");

    cart.add_line(&buyer, product, "Red", 1).await.unwrap();
    let line = cart
        .set_line_quantity(&buyer, product, "Red", 4)
        .await
        .unwrap();
    assert_eq!(line.quantity, 4);

    let err = cart
        .set_line_quantity(&buyer, product, "Red", 5)
        .await
        .unwrap_err();
    assert!(is_invalid(&err));

    cart.remove_line(&buyer, product, "Red").await.unwrap();
    let err = cart.remove_line(&buyer, product, "Red").await.unwrap_err();
    assert!(is_not_found(&err));

    let contents = cart.read_cart(&buyer).await.unwrap().unwrap();
    assert!(contents.items.is_empty());
    assert_eq!(contents.subtotal, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_concurrent_adds_never_exceed_stock() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let buyer = create_account(pool, "buyer", Role::Buyer).await.unwrap();
    let product = create_product(pool, &seller, &[("Red", 1000, 5)]).await.unwrap();
    let cart = CartService::new(pools.for_role(Role::Buyer));

    let (first, second) = tokio::join!(
        cart.add_line(&buyer, product, "Red", 3),
        cart.add_line(&buyer, product, "Red", 3),
    );

    let succeeded = [first.is_ok(), second.is_ok()]
        .into_iter()
        .filter(|ok| *ok)
        .count();
    assert_eq!(succeeded, 1);
    for result in [first, second] {
        if let Err(err) = result {
            assert!(is_invalid(&err));
            assert_eq!(
                err.to_string(),
                "Insufficient stock. Available: 5. You already have 3 in cart."
            );
        }
    }

    let contents = cart.read_cart(&buyer).await.unwrap().unwrap();
    assert_eq!(contents.items[0].quantity, 3);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at BAZAAR_TEST_DATABASE_URL"]
async fn test_read_cart_without_cart_is_none() {
    let pools = test_pools().await.unwrap();
    let pool = pools.public().pool();
    let seller = create_account(pool, "seller", Role::Seller).await.unwrap();
    let cart = CartService::new(pools.for_role(Role::Buyer));

    assert!(cart.read_cart(&seller).await.unwrap().is_none());
}
