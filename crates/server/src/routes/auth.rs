//! Login and profile handlers.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use super::extract::Json;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::user::Profile;
use crate::services::accounts::AccountService;
use crate::services::auth::{AuthService, LoginResponse};
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_name: String,
    pub password: String,
}

/// `POST /auth/login`
#[instrument(skip(state, body), fields(login_name = %body.login_name))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.public_storage().pool(), state.tokens());
    let response = auth
        .login(&body.login_name, &body.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

    tracing::info!(role = %response.role, "Login succeeded");
    Ok(Json(response))
}

/// `GET /auth/profile`
#[instrument(skip(state, user))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>> {
    let profile = AccountService::new(state.storage(user.role))
        .profile(&user)
        .await?;
    Ok(Json(profile))
}
