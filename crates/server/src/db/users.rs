//! User repository for accounts, buyer/seller totals and admin views.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use bazaar_core::{LoginName, Role};

use super::RepositoryError;
use crate::models::user::{NewUser, PlatformStats, RoleStats, User, UserCredentials, UserUpdate};

/// Raw `app_user` row; `role` is validated on conversion.
#[derive(sqlx::FromRow)]
struct UserRow {
    login_name: LoginName,
    role: String,
    full_name: String,
    email: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;
        Ok(Self {
            login_name: row.login_name,
            role,
            full_name: row.full_name,
            email: row.email,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

const USER_COLUMNS: &str = "login_name, role, full_name, email, is_active, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user and their password hash by login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn get_credentials(
        &self,
        login_name: &LoginName,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let row: Option<CredentialsRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM bazaar.app_user WHERE login_name = $1"
        ))
        .bind(login_name)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            Ok(UserCredentials {
                user: User::try_from(r.user)?,
                password_hash: r.password_hash,
            })
        })
        .transpose()
    }

    /// Get a user by login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn get(&self, login_name: &LoginName) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM bazaar.app_user WHERE login_name = $1"
        ))
        .bind(login_name)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Buyer totals: money spent and number of orders placed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn buyer_stats(
        &self,
        login_name: &LoginName,
    ) -> Result<Option<RoleStats>, RepositoryError> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r"
            SELECT b.money_spent,
                   (SELECT COUNT(*) FROM bazaar.orders o WHERE o.buyer_login_name = b.login_name)
            FROM bazaar.buyer b
            WHERE b.login_name = $1
            ",
        )
        .bind(login_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(money_spent, order_count)| RoleStats::Buyer {
            money_spent,
            order_count,
        }))
    }

    /// Seller totals: shop name, earnings and number of listed products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn seller_stats(
        &self,
        login_name: &LoginName,
    ) -> Result<Option<RoleStats>, RepositoryError> {
        let row: Option<(String, i64, i64)> = sqlx::query_as(
            r"
            SELECT s.shop_name, s.money_earned,
                   (SELECT COUNT(*) FROM bazaar.product p WHERE p.seller_login_name = s.login_name)
            FROM bazaar.seller s
            WHERE s.login_name = $1
            ",
        )
        .bind(login_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(shop_name, money_earned, product_count)| RoleStats::Seller {
            shop_name,
            money_earned,
            product_count,
        }))
    }

    /// A seller's running earnings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the login name is not a seller.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn seller_earnings(&self, login_name: &LoginName) -> Result<i64, RepositoryError> {
        let earned: i64 =
            sqlx::query_scalar("SELECT money_earned FROM bazaar.seller WHERE login_name = $1")
                .bind(login_name)
                .fetch_one(self.pool)
                .await?;
        Ok(earned)
    }

    /// List accounts, optionally restricted to one role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, role: Option<Role>) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM bazaar.app_user
             WHERE $1::text IS NULL OR role = $1
             ORDER BY login_name"
        ))
        .bind(role.map(|r| r.as_str()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Apply an admin update to an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this login name.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        login_name: &LoginName,
        update: &UserUpdate,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "UPDATE bazaar.app_user SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                is_active = COALESCE($4, is_active)
             WHERE login_name = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(login_name)
        .bind(update.full_name.as_deref())
        .bind(update.email.as_deref())
        .bind(update.is_active)
        .fetch_one(self.pool)
        .await?;

        User::try_from(row)
    }

    /// Platform-wide counters for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn platform_stats(&self) -> Result<PlatformStats, RepositoryError> {
        let by_role: Vec<(String, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM bazaar.app_user GROUP BY role")
                .fetch_all(self.pool)
                .await?;

        let (order_count, gross_merchandise_value): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_price), 0)::BIGINT FROM bazaar.orders",
        )
        .fetch_one(self.pool)
        .await?;

        let mut users_by_role = Role::ALL
            .iter()
            .map(|r| (r.as_str().to_owned(), 0))
            .collect::<std::collections::BTreeMap<_, _>>();
        users_by_role.extend(by_role);

        Ok(PlatformStats {
            users_by_role,
            order_count,
            gross_merchandise_value,
        })
    }

    /// Create an account with its role row, and a cart for buyers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the login name is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO bazaar.app_user (login_name, password_hash, role, full_name, email)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.login_name)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(&new_user.full_name)
        .bind(new_user.email.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        Self::create_role_row(&mut tx, new_user).await?;
        tx.commit().await?;

        User::try_from(row)
    }

    async fn create_role_row(
        conn: &mut PgConnection,
        new_user: &NewUser,
    ) -> Result<(), RepositoryError> {
        match new_user.role {
            Role::Buyer => {
                sqlx::query("INSERT INTO bazaar.buyer (login_name) VALUES ($1)")
                    .bind(&new_user.login_name)
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("INSERT INTO bazaar.cart (login_name) VALUES ($1)")
                    .bind(&new_user.login_name)
                    .execute(&mut *conn)
                    .await?;
            }
            Role::Seller => {
                let shop_name = new_user
                    .shop_name
                    .clone()
                    .unwrap_or_else(|| new_user.full_name.clone());
                sqlx::query("INSERT INTO bazaar.seller (login_name, shop_name) VALUES ($1, $2)")
                    .bind(&new_user.login_name)
                    .bind(shop_name)
                    .execute(&mut *conn)
                    .await?;
            }
            Role::Admin => {}
        }
        Ok(())
    }
}
