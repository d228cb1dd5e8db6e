//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password, unknown or deactivated user).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No bearer token on a protected route.
    #[error("missing bearer token")]
    MissingToken,

    /// Token is malformed, expired or signed with another key.
    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    /// Token subject or role no longer parses.
    #[error("invalid token claims")]
    InvalidClaims,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Token signing failed.
    #[error("token signing error: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
