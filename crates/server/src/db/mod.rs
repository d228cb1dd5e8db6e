//! Database operations for the marketplace `PostgreSQL` schema.
//!
//! # Schema: `bazaar`
//!
//! ## Tables
//!
//! - `app_user`, `buyer`, `seller` - Accounts and running money totals
//! - `product`, `variant`, `image`, `comment` - Catalog
//! - `cart`, `cart_line` - One cart per buyer
//! - `address`, `payment_provider`, `delivery_method`, `delivery_provider` - Order references
//! - `orders`, `sub_order`, `sub_order_detail` - Order tree (one sub-order per seller)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```
//!
//! # Storage context
//!
//! Handlers never reach for a global pool. They ask [`crate::state::AppState`]
//! for the [`StorageContext`] of the caller's role and pass it down, so the
//! role-to-database mapping stays visible at every call site.

pub mod carts;
pub mod catalog;
pub mod orders;
pub mod statistics;
pub mod users;

use std::borrow::Cow;
use std::time::Duration;

use bazaar_core::Role;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

use crate::config::DatabaseConfig;

pub use carts::CartRepository;
pub use catalog::CatalogRepository;
pub use orders::OrderRepository;
pub use statistics::StatisticsRepository;
pub use users::UserRepository;

/// `PostgreSQL` SQLSTATE codes the translator understands.
mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const CHECK_VIOLATION: &str = "23514";
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx that no other variant describes.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Uniqueness violation (`23505`).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key violation (`23503`).
    #[error("foreign key violation on {constraint}")]
    ForeignKey { constraint: String },

    /// Check constraint violation (`23514`).
    #[error("check violation on {constraint}")]
    CheckViolation { constraint: String },
}

impl RepositoryError {
    /// Translate a sqlx error by vendor error code.
    #[must_use]
    pub fn classify(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Self::NotFound;
        }

        let details = err.as_database_error().map(|db_err| {
            (
                db_err.code().map(Cow::into_owned),
                db_err.constraint().unwrap_or_default().to_owned(),
                db_err.message().to_owned(),
            )
        });
        let Some((code, constraint, message)) = details else {
            return Self::Database(err);
        };

        match code.as_deref() {
            Some(sqlstate::UNIQUE_VIOLATION) if constraint.is_empty() => Self::Conflict(message),
            Some(sqlstate::UNIQUE_VIOLATION) => Self::Conflict(constraint),
            Some(sqlstate::FOREIGN_KEY_VIOLATION) => Self::ForeignKey { constraint },
            Some(sqlstate::CHECK_VIOLATION) => Self::CheckViolation { constraint },
            _ => Self::Database(err),
        }
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        Self::classify(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// One pool per role, plus the public pool for unauthenticated requests.
///
/// Roles without their own URL share the public pool (`PgPool` is an `Arc`).
#[derive(Debug, Clone)]
pub struct RolePools {
    public: PgPool,
    buyer: PgPool,
    seller: PgPool,
    admin: PgPool,
}

impl RolePools {
    /// Connect every configured pool.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if any connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let public = create_pool(&config.url).await?;
        let buyer = Self::connect_or_share(config.buyer_url.as_ref(), &public).await?;
        let seller = Self::connect_or_share(config.seller_url.as_ref(), &public).await?;
        let admin = Self::connect_or_share(config.admin_url.as_ref(), &public).await?;
        Ok(Self {
            public,
            buyer,
            seller,
            admin,
        })
    }

    /// Use a single pool for every role.
    #[must_use]
    pub fn shared(pool: PgPool) -> Self {
        Self {
            buyer: pool.clone(),
            seller: pool.clone(),
            admin: pool.clone(),
            public: pool,
        }
    }

    async fn connect_or_share(
        url: Option<&secrecy::SecretString>,
        public: &PgPool,
    ) -> Result<PgPool, sqlx::Error> {
        match url {
            Some(url) => create_pool(url).await,
            None => Ok(public.clone()),
        }
    }

    /// Storage context for a role.
    #[must_use]
    pub const fn for_role(&self, role: Role) -> StorageContext<'_> {
        let pool = match role {
            Role::Buyer => &self.buyer,
            Role::Seller => &self.seller,
            Role::Admin => &self.admin,
        };
        StorageContext {
            role: Some(role),
            pool,
        }
    }

    /// Storage context for unauthenticated requests.
    #[must_use]
    pub const fn public(&self) -> StorageContext<'_> {
        StorageContext {
            role: None,
            pool: &self.public,
        }
    }
}

/// The datasource selected for one request.
#[derive(Debug, Clone, Copy)]
pub struct StorageContext<'a> {
    role: Option<Role>,
    pool: &'a PgPool,
}

impl<'a> StorageContext<'a> {
    /// The role this context was selected for (`None` for public access).
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// The pool backing this context.
    #[must_use]
    pub const fn pool(&self) -> &'a PgPool {
        self.pool
    }

    /// Start a transaction. Dropping it without `commit` rolls back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection can be acquired.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, RepositoryError> {
        Ok(self.pool.begin().await?)
    }
}
