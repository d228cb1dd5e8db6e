//! Business logic services.
//!
//! # Services
//!
//! - [`auth`] - Password login and bearer tokens
//! - [`cart`] - Cart Manager: locked, stock-checked line mutations
//! - [`orders`] - Order Workflow: one transaction from items to order tree
//! - [`statistics`] - Per-product sales statistics
//! - [`catalog`] - Public listings and the seller's own catalog
//! - [`accounts`] - Profiles, seller earnings, admin views
//!
//! Every service is built from the [`StorageContext`](crate::db::StorageContext)
//! chosen for the caller's role and logs its failures before returning them.

pub mod accounts;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod statistics;

use thiserror::Error;

use bazaar_core::DomainError;

use crate::db::RepositoryError;

/// Errors returned by the marketplace services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A business rule rejected the request.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// An enumerated field had a value outside its lookup table.
    #[error("{message}")]
    InvalidChoice {
        message: String,
        choices: &'static [&'static str],
    },

    /// Storage failure not yet mapped to a domain error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Unexpected failure with a message for the logs.
    #[error("{0}")]
    Internal(String),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::classify(err))
    }
}

impl ServiceError {
    /// Whether this is a caller mistake rather than a server fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Domain(_)
                | Self::InvalidChoice { .. }
                | Self::Repository(
                    RepositoryError::NotFound
                        | RepositoryError::Conflict(_)
                        | RepositoryError::ForeignKey { .. }
                        | RepositoryError::CheckViolation { .. }
                )
        )
    }
}

/// Log a failed operation. Runs inside the operation's span, so the
/// identifying fields recorded there are attached.
pub(crate) fn log_failure(operation: &'static str, err: &ServiceError) {
    if err.is_client_error() {
        tracing::warn!(operation, error = %err, "Request rejected");
    } else {
        tracing::error!(operation, error = %err, "Operation failed");
    }
}
