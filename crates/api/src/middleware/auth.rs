//! Bearer token authentication.
//!
//! Provides the [`AuthUser`] extractor for routes that require a signed-in user.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use arvigo_core::{CatalogTables, Role, RoleId, UserId};

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// The user a valid bearer token was issued to.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.full_name)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub role_id: RoleId,
    pub full_name: String,
}

impl AuthUser {
    /// Fails with 403 unless the token was issued to a user with `role`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for any other role, or if `role` has no
    /// id in the lookup tables.
    pub fn require_role(&self, tables: &CatalogTables, role: Role) -> Result<(), AppError> {
        if tables.role_id_of(role) == Some(self.role_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Only {role} accounts can do this")))
        }
    }
}

/// The token part of an `Authorization` header value.
fn bearer_token(header: &str) -> &str {
    header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim()
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_owned()))?;

        let header = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid token".to_owned()))?;

        let token = bearer_token(header);
        if token.is_empty() {
            return Err(AppError::Unauthorized("Missing token".to_owned()));
        }

        let claims = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            AppError::Unauthorized("Invalid token".to_owned())
        })?;

        set_sentry_user(&claims.id, Some(&claims.full_name));

        Ok(Self {
            id: claims.id,
            role_id: claims.role_id,
            full_name: claims.full_name,
        })
    }
}
