//! HS256 bearer tokens.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use arvigo_core::{RoleId, UserId};

use crate::config::JwtConfig;

/// Claims carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: UserId,
    pub role_id: RoleId,
    pub full_name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys derived from `JWT_SECRET`.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry_secs: i64,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("keys", &"[REDACTED]")
            .field("expiry_secs", &self.expiry_secs)
            .finish()
    }
}

impl TokenKeys {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            // Only HS256 is accepted; tokens signed any other way are rejected.
            validation: Validation::new(Algorithm::HS256),
            expiry_secs: i64::try_from(config.expiry.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Sign a token for a user.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error if encoding fails.
    pub fn issue(
        &self,
        id: UserId,
        role_id: RoleId,
        full_name: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            id,
            role_id,
            full_name: full_name.to_owned(),
            iat: now,
            exp: now.saturating_add(self.expiry_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Check the signature, algorithm and expiry of a token.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error describing why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}
