//! Seed the database with demo data for local development.
//!
//! Creates `demo_seller`, `demo_buyer` (with one address) and a product with
//! two variants. Accounts that already exist are left alone; the product is
//! inserted on every run. Both accounts use `BAZAAR_NEW_USER_PASSWORD`.

use bazaar_core::{AddressId, LoginName, Role};
use bazaar_server::db::{CatalogRepository, RepositoryError, UserRepository};
use bazaar_server::models::catalog::{NewProduct, VariantInput};
use bazaar_server::models::user::NewUser;
use bazaar_server::services::auth::hash_password;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use super::{CliError, connect, required_env};

const DEMO_SELLER: &str = "demo_seller";
const DEMO_BUYER: &str = "demo_buyer";

fn demo_product() -> NewProduct {
    NewProduct {
        name: "Bamboo Desk Lamp".to_string(),
        description: "Hand-finished bamboo lamp with a linen shade.".to_string(),
        category: "Home".to_string(),
        brand: "Lan's Crafts".to_string(),
        variants: vec![
            VariantInput {
                variant_name: "Natural".to_string(),
                price: 250_000,
                in_stock_number: 20,
            },
            VariantInput {
                variant_name: "Walnut".to_string(),
                price: 290_000,
                in_stock_number: 8,
            },
        ],
    }
}

/// Create an account unless one with the same login name exists.
async fn ensure_account(pool: &PgPool, new_user: &NewUser) -> Result<(), CliError> {
    match UserRepository::new(pool).create(new_user).await {
        Ok(user) => {
            info!("  Created {} ({})", user.login_name, user.role);
            Ok(())
        }
        Err(RepositoryError::Conflict(_)) => {
            info!("  {} already exists, skipping", new_user.login_name);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn demo_login(name: &str) -> Result<LoginName, CliError> {
    LoginName::parse(name).ok_or_else(|| CliError::InvalidInput(name.to_string()))
}

/// Seed demo accounts and a product.
///
/// # Errors
///
/// Returns `CliError` if the password is missing or a database call fails.
pub async fn demo() -> Result<(), CliError> {
    let password = required_env("BAZAAR_NEW_USER_PASSWORD")?;
    let password_hash = hash_password(password.expose_secret())?;
    let seller = demo_login(DEMO_SELLER)?;
    let buyer = demo_login(DEMO_BUYER)?;

    let pool = connect().await?;
    info!("Seeding demo data");

    ensure_account(
        &pool,
        &NewUser {
            login_name: seller.clone(),
            password_hash: password_hash.clone(),
            role: Role::Seller,
            full_name: "Lan Tran".to_string(),
            email: Some("lan@example.com".to_string()),
            shop_name: Some("Lan's Crafts".to_string()),
        },
    )
    .await?;

    ensure_account(
        &pool,
        &NewUser {
            login_name: buyer.clone(),
            password_hash,
            role: Role::Buyer,
            full_name: "Minh Pham".to_string(),
            email: Some("minh@example.com".to_string()),
            shop_name: None,
        },
    )
    .await?;

    let address_id: AddressId = sqlx::query_scalar(
        "INSERT INTO bazaar.address (login_name, recipient_name, phone, street, district, city)
         VALUES ($1, 'Minh Pham', '0900000000', '12 Ly Thuong Kiet', 'Hoan Kiem', 'Ha Noi')
         RETURNING address_id",
    )
    .bind(&buyer)
    .fetch_one(&pool)
    .await?;
    info!("  Address {} for {}", address_id, buyer);

    let product = CatalogRepository::new(&pool)
        .create(&seller, &demo_product())
        .await?;
    info!(
        "  Product {} \"{}\" with {} variants",
        product.product.product_id,
        product.product.name,
        product.variants.len()
    );

    info!("Seeding complete!");
    Ok(())
}
