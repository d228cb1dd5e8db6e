//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; the body is always
//! `{ "error": string, "code": string, "details"?: object }`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use bazaar_core::DomainError;

use crate::db::RepositoryError;
use crate::services::ServiceError;
use crate::services::auth::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input or a business rule violation.
    #[error("{0}")]
    InvalidArgument(String),

    /// An enumerated field had an unknown value.
    #[error("{message}")]
    InvalidChoice {
        message: String,
        choices: &'static [&'static str],
    },

    /// Missing or invalid bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Valid token, wrong role or not the owner.
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation.
    #[error("{0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) | Self::InvalidChoice { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) | Self::InvalidChoice { .. } => "INVALID_ARGUMENT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) | Self::Internal(_) => "INTERNAL",
        }
    }

    fn body(&self) -> Value {
        match self {
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => json!({
                "error": "Internal server error",
                "code": self.code(),
            }),
            Self::InvalidChoice { message, choices } => json!({
                "error": message,
                "code": self.code(),
                "details": { "validChoices": choices },
            }),
            _ => json!({
                "error": self.to_string(),
                "code": self.code(),
            }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), Json(self.body())).into_response()
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidArgument(m) => Self::InvalidArgument(m),
            DomainError::NotFound(m) => Self::NotFound(m),
            DomainError::Forbidden(m) => Self::Forbidden(m),
        }
    }
}

/// Translate storage failures that no service mapped more precisely.
impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Not found".to_string()),
            RepositoryError::Conflict(_) => Self::Conflict("Resource already exists".to_string()),
            RepositoryError::ForeignKey { constraint } => {
                Self::InvalidArgument(format!("Invalid reference ({constraint})"))
            }
            RepositoryError::CheckViolation { constraint } => {
                Self::InvalidArgument(format!("Invalid value ({constraint})"))
            }
            other @ (RepositoryError::Database(_) | RepositoryError::DataCorruption(_)) => {
                Self::Database(other)
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => e.into(),
            ServiceError::InvalidChoice { message, choices } => {
                Self::InvalidChoice { message, choices }
            }
            ServiceError::Repository(e) => e.into(),
            ServiceError::Internal(m) => Self::Internal(m),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::InvalidArgument("Invalid login name or password".to_string())
            }
            AuthError::MissingToken => Self::Unauthorized("Missing bearer token".to_string()),
            AuthError::InvalidToken(_) | AuthError::InvalidClaims => {
                Self::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::WeakPassword(m) => Self::InvalidArgument(m),
            AuthError::Repository(e) => e.into(),
            e @ (AuthError::TokenSigning(_) | AuthError::PasswordHash) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(login_name: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(login_name.to_string()),
            ..Default::default()
        }));
    });
}
