//! Shared-key authentication for service-to-service routes.

use axum::{extract::FromRequestParts, http::request::Parts};
use constant_time_eq::constant_time_eq;
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Proof that the request carried the configured `ML_API_KEY`.
///
/// With no key configured every request is rejected.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

fn key_matches(expected: &str, given: &str) -> bool {
    !expected.is_empty() && constant_time_eq(expected.as_bytes(), given.as_bytes())
}

impl FromRequestParts<AppState> for ApiKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let given = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let expected = state.config().ml_api_key.as_ref();
        if expected.is_some_and(|key| key_matches(key.expose_secret(), given)) {
            Ok(Self)
        } else {
            tracing::debug!(has_header = !given.is_empty(), "API key rejected");
            Err(AppError::Unauthorized("Invalid API key".to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_must_match_exactly() {
        assert!(key_matches("k3y-from-env", "k3y-from-env"));
        assert!(!key_matches("k3y-from-env", "k3y-from-en"));
        assert!(!key_matches("k3y-from-env", ""));
        assert!(!key_matches("", ""));
    }
}
