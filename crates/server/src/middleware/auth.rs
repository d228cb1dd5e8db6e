//! Bearer token extractors.
//!
//! Handlers name the role they need in their signature:
//!
//! ```rust,ignore
//! async fn earnings(
//!     State(state): State<AppState>,
//!     RequireSeller(seller): RequireSeller,
//! ) -> Result<Json<SellerEarnings>> { ... }
//! ```
//!
//! A missing or invalid token is rejected with 401, a valid token for
//! another role with 403.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use bazaar_core::Role;

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Read and verify the bearer token on a request.
fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthError> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let user = state.tokens().verify(token).inspect_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected");
    })?;

    tracing::Span::current().record("login_name", user.login_name.as_str());
    set_sentry_user(&user.login_name);
    Ok(user)
}

fn require_role(parts: &Parts, state: &AppState, role: Role) -> Result<CurrentUser, AppError> {
    let user = authenticate(parts, state)?;
    if user.role != role {
        return Err(AppError::Forbidden(format!(
            "This action requires the {role} role"
        )));
    }
    Ok(user)
}

/// Any authenticated caller.
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(Self(authenticate(parts, &state)?))
    }
}

macro_rules! role_extractor {
    ($(#[$meta:meta])* $name:ident, $role:expr) => {
        $(#[$meta])*
        pub struct $name(pub CurrentUser);

        impl<S> FromRequestParts<S> for $name
        where
            AppState: FromRef<S>,
            S: Send + Sync,
        {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &S,
            ) -> Result<Self, Self::Rejection> {
                let state = AppState::from_ref(state);
                Ok(Self(require_role(parts, &state, $role)?))
            }
        }
    };
}

role_extractor!(
    /// Caller authenticated as a buyer.
    RequireBuyer,
    Role::Buyer
);
role_extractor!(
    /// Caller authenticated as a seller.
    RequireSeller,
    Role::Seller
);
role_extractor!(
    /// Caller authenticated as an admin.
    RequireAdmin,
    Role::Admin
);
