//! Profile routes.

use axum::extract::State;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::UserProfile;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /v1/users/me
///
/// # Errors
///
/// Returns 404 if the token's user no longer exists.
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<ApiResponse<UserProfile>> {
    let profile = state.profiles().profile(user.id).await?;
    Ok(ApiResponse::ok("Success", profile))
}
