//! Accounts: profiles, seller earnings and admin views.

use tracing::instrument;

use bazaar_core::{DomainError, LoginName, Role};

use super::{ServiceError, log_failure};
use crate::db::{RepositoryError, StorageContext, UserRepository};
use crate::models::CurrentUser;
use crate::models::user::{PlatformStats, Profile, SellerEarnings, User, UserUpdate};

pub struct AccountService<'a> {
    storage: StorageContext<'a>,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(storage: StorageContext<'a>) -> Self {
        Self { storage }
    }

    fn repo(&self) -> UserRepository<'a> {
        UserRepository::new(self.storage.pool())
    }

    /// The caller's account with role-specific totals.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the account behind the token no longer exists.
    #[instrument(skip(self), fields(login_name = %caller.login_name))]
    pub async fn profile(&self, caller: &CurrentUser) -> Result<Profile, ServiceError> {
        self.try_profile(caller)
            .await
            .inspect_err(|e| log_failure("profile", e))
    }

    async fn try_profile(&self, caller: &CurrentUser) -> Result<Profile, ServiceError> {
        let repo = self.repo();
        let user = repo
            .get(&caller.login_name)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        let stats = match user.role {
            Role::Buyer => repo.buyer_stats(&user.login_name).await?,
            Role::Seller => repo.seller_stats(&user.login_name).await?,
            Role::Admin => None,
        };
        Ok(Profile { user, stats })
    }

    /// The seller's running earnings.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the caller has no seller row.
    #[instrument(skip(self), fields(seller = %seller))]
    pub async fn seller_earnings(&self, seller: &LoginName) -> Result<SellerEarnings, ServiceError> {
        self.repo()
            .seller_earnings(seller)
            .await
            .map(|earnings| SellerEarnings { earnings })
            .map_err(|e| match e {
                RepositoryError::NotFound => DomainError::not_found("Seller not found").into(),
                other => other.into(),
            })
            .inspect_err(|e| log_failure("sellerEarnings", e))
    }

    /// Every account, optionally restricted to one role.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if the read fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, ServiceError> {
        self.repo()
            .list(role)
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("listUsers", e))
    }

    /// Change an account's name, email or active flag.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` when the update is empty or the name is blank.
    /// - `NotFound` when no account has this login name.
    #[instrument(skip(self, update), fields(login_name = %login_name))]
    pub async fn update_user(
        &self,
        login_name: &LoginName,
        update: &UserUpdate,
    ) -> Result<User, ServiceError> {
        self.try_update_user(login_name, update)
            .await
            .inspect_err(|e| log_failure("updateUser", e))
    }

    async fn try_update_user(
        &self,
        login_name: &LoginName,
        update: &UserUpdate,
    ) -> Result<User, ServiceError> {
        if update.is_empty() {
            return Err(DomainError::invalid("Nothing to update").into());
        }
        if update.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(DomainError::invalid("Full name must not be empty").into());
        }

        self.repo()
            .update(login_name, update)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => DomainError::not_found("User not found").into(),
                other => other.into(),
            })
    }

    /// Platform-wide counters.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if a read fails.
    #[instrument(skip(self))]
    pub async fn platform_stats(&self) -> Result<PlatformStats, ServiceError> {
        self.repo()
            .platform_stats()
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("platformStats", e))
    }
}
