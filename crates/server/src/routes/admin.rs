//! Admin handlers (`/admin`).

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{LoginName, Role};

use super::extract::{Json, Path, Query};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::user::{PlatformStats, User, UserUpdate};
use crate::services::accounts::AccountService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub role: Option<String>,
}

/// `GET /admin/users[?role=]`
#[instrument(skip(state, admin), fields(admin = %admin.login_name))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<UsersQuery>,
) -> Result<Json<Vec<User>>> {
    let role = query
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    let users = AccountService::new(state.storage(admin.role))
        .list_users(role)
        .await?;
    Ok(Json(users))
}

/// `PUT /admin/users/{loginName}`
#[instrument(skip(state, admin, body), fields(admin = %admin.login_name))]
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(login_name): Path<String>,
    Json(body): Json<UserUpdate>,
) -> Result<Json<User>> {
    let login_name = LoginName::parse(&login_name)
        .ok_or_else(|| AppError::InvalidArgument("Invalid login name".to_string()))?;

    let user = AccountService::new(state.storage(admin.role))
        .update_user(&login_name, &body)
        .await?;
    Ok(Json(user))
}

/// `GET /admin/stats`
#[instrument(skip(state, admin), fields(admin = %admin.login_name))]
pub async fn platform_stats(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<PlatformStats>> {
    let stats = AccountService::new(state.storage(admin.role))
        .platform_stats()
        .await?;
    Ok(Json(stats))
}
