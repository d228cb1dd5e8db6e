//! Account management commands.
//!
//! The password is taken from `BAZAAR_NEW_USER_PASSWORD` so it never shows
//! up in shell history or the process list.

use bazaar_core::{LoginName, Role};
use bazaar_server::db::{RepositoryError, UserRepository};
use bazaar_server::models::user::NewUser;
use bazaar_server::services::auth::{hash_password, validate_password};
use secrecy::ExposeSecret;

use super::{CliError, connect, required_env};

/// Validate command-line input into a [`NewUser`] without touching the database.
pub(crate) fn build_new_user(
    login: &str,
    name: &str,
    role: &str,
    email: Option<String>,
    shop_name: Option<String>,
    password_hash: String,
) -> Result<NewUser, CliError> {
    let login_name = LoginName::parse(login)
        .ok_or_else(|| CliError::InvalidInput(format!("invalid login name: {login:?}")))?;
    let role = role
        .parse::<Role>()
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let full_name = name.trim();
    if full_name.is_empty() {
        return Err(CliError::InvalidInput("full name must not be blank".to_string()));
    }

    Ok(NewUser {
        login_name,
        password_hash,
        role,
        full_name: full_name.to_owned(),
        email: email.filter(|e| !e.trim().is_empty()),
        shop_name: shop_name.filter(|s| !s.trim().is_empty()),
    })
}

/// Create a buyer, seller or admin account.
///
/// # Errors
///
/// Returns `CliError` for invalid input, a weak password, a taken login
/// name, or database failures.
pub async fn create_user(
    login: &str,
    name: &str,
    role: &str,
    email: Option<String>,
    shop_name: Option<String>,
) -> Result<(), CliError> {
    let password = required_env("BAZAAR_NEW_USER_PASSWORD")?;
    validate_password(password.expose_secret())?;
    let password_hash = hash_password(password.expose_secret())?;

    let new_user = build_new_user(login, name, role, email, shop_name, password_hash)?;

    let pool = connect().await?;
    tracing::info!("Creating account: {} ({})", new_user.login_name, new_user.role);

    let user = UserRepository::new(&pool)
        .create(&new_user)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CliError::InvalidInput(format!(
                "an account named {} already exists",
                new_user.login_name
            )),
            other => other.into(),
        })?;

    tracing::info!(
        "Account created successfully! Login: {}, Role: {}",
        user.login_name,
        user.role
    );
    Ok(())
}
