//! Application state shared across handlers.

use std::sync::Arc;

use bazaar_core::Role;

use crate::config::ServerConfig;
use crate::db::{RolePools, StorageContext};
use crate::services::auth::TokenKeys;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and holds the immutable
/// configuration, the per-role connection pools and the token keys.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pools: RolePools,
    tokens: TokenKeys,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pools: RolePools) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret, config.token_ttl_hours);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pools,
                tokens,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Storage context for a caller acting as `role`.
    #[must_use]
    pub fn storage(&self, role: Role) -> StorageContext<'_> {
        self.inner.pools.for_role(role)
    }

    /// Storage context for unauthenticated requests.
    #[must_use]
    pub fn public_storage(&self) -> StorageContext<'_> {
        self.inner.pools.public()
    }

    /// Bearer token keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }
}
