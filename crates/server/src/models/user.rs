//! Account domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{LoginName, Role};

/// A marketplace account (buyer, seller or admin).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub login_name: LoginName,
    pub role: Role,
    pub full_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored password hash.
///
/// Never serialized; only the login flow reads it.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Role-specific figures shown on the profile page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", untagged)]
pub enum RoleStats {
    #[serde(rename_all = "camelCase")]
    Buyer { money_spent: i64, order_count: i64 },
    #[serde(rename_all = "camelCase")]
    Seller {
        shop_name: String,
        money_earned: i64,
        product_count: i64,
    },
}

/// `GET /auth/profile` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RoleStats>,
}

/// Fields an admin may change on an account. Absent fields are left as-is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.is_active.is_none()
    }
}

/// Input for provisioning an account from the CLI.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login_name: LoginName,
    pub password_hash: String,
    pub role: Role,
    pub full_name: String,
    pub email: Option<String>,
    /// Required for sellers, ignored otherwise.
    pub shop_name: Option<String>,
}

/// `GET /admin/stats` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub users_by_role: BTreeMap<String, i64>,
    pub order_count: i64,
    pub gross_merchandise_value: i64,
}

/// `GET /seller/earnings` response.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SellerEarnings {
    pub earnings: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn buyer() -> User {
        User {
            login_name: LoginName::parse("alice").unwrap(),
            role: Role::Buyer,
            full_name: "Alice Nguyen".to_string(),
            email: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_flattens_user_and_stats() {
        let profile = Profile {
            user: buyer(),
            stats: Some(RoleStats::Buyer {
                money_spent: 90_000,
                order_count: 2,
            }),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["loginName"], "alice");
        assert_eq!(json["role"], "buyer");
        assert_eq!(json["stats"]["moneySpent"], 90_000);
        assert_eq!(json["stats"]["orderCount"], 2);
    }

    #[test]
    fn test_profile_without_stats_omits_field() {
        let profile = Profile {
            user: buyer(),
            stats: None,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("stats").is_none());
    }

    #[test]
    fn test_user_update_is_empty() {
        assert!(UserUpdate::default().is_empty());
        let update: UserUpdate = serde_json::from_str(r#"{"isActive": false}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.is_active, Some(false));
    }
}
