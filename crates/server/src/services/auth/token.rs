//! Bearer token issue and verification (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bazaar_core::{LoginName, Role};

use super::AuthError;
use crate::models::CurrentUser;

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Login name
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix timestamp seconds)
    pub iat: i64,
    /// Expiration (Unix timestamp seconds)
    pub exp: i64,
}

/// Signing and verification keys derived from the configured secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenKeys {
    /// Build keys from the shared secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Sign a token for `login_name` acting as `role`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, login_name: &LoginName, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: login_name.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::TokenSigning)
    }

    /// Verify a token and return the identity it carries.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the signature or expiry check fails.
    /// Returns `AuthError::InvalidClaims` if the subject is not a login name.
    pub fn verify(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(AuthError::InvalidToken)?;

        let login_name = LoginName::parse(&data.claims.sub).ok_or(AuthError::InvalidClaims)?;
        Ok(CurrentUser {
            login_name,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new(&SecretString::from("k3Y!".repeat(8)), 24)
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys();
        let seller = LoginName::parse("shop-a").unwrap();
        let token = keys.issue(&seller, Role::Seller).unwrap();

        let user = keys.verify(&token).unwrap();
        assert_eq!(user.login_name, seller);
        assert_eq!(user.role, Role::Seller);
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let token = keys()
            .issue(&LoginName::parse("alice").unwrap(), Role::Buyer)
            .unwrap();
        let other = TokenKeys::new(&SecretString::from("0th3r-k3y".repeat(4)), 24);
        assert!(matches!(
            other.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let expired = TokenKeys::new(&SecretString::from("k3Y!".repeat(8)), -2);
        let token = expired
            .issue(&LoginName::parse("alice").unwrap(), Role::Buyer)
            .unwrap();
        assert!(keys().verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(keys().verify("not.a.jwt").is_err());
    }
}
