//! Command implementations.
//!
//! # Environment Variables
//!
//! - `BAZAAR_DATABASE_URL` - `PostgreSQL` connection string (needs DDL rights for `migrate`)
//! - `BAZAAR_NEW_USER_PASSWORD` - Password for `user create`

pub mod migrate;
pub mod seed;
pub mod users;

use bazaar_server::db::RepositoryError;
use bazaar_server::services::auth::AuthError;
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository call failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Password rejected or hashing failed.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Bad command-line input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Read a required environment variable, loading `.env` first.
fn required_env(key: &'static str) -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();
    std::env::var(key)
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar(key))
}

/// Connect to the database named by `BAZAAR_DATABASE_URL`.
async fn connect() -> Result<PgPool, CliError> {
    let url = required_env("BAZAAR_DATABASE_URL")?;
    tracing::info!("Connecting to database...");
    Ok(bazaar_server::db::create_pool(&url).await?)
}
