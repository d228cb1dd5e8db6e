//! Domain rule violations.

use thiserror::Error;

/// A business rule rejected the request.
///
/// The message is user-facing and is returned to clients verbatim, so it
/// must never contain storage details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input is malformed or violates a business rule (stock, overflow, enums).
    #[error("{0}")]
    InvalidArgument(String),

    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The caller may not act on the referenced record.
    #[error("{0}")]
    Forbidden(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Shorthand for [`DomainError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// The message carried by any variant.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(m) | Self::NotFound(m) | Self::Forbidden(m) => m,
        }
    }
}
