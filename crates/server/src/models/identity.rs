//! The authenticated caller.

use serde::{Deserialize, Serialize};

use bazaar_core::{LoginName, Role};

/// Identity carried by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub login_name: LoginName,
    pub role: Role,
}
