//! Merchant dashboard routes.

use axum::extract::State;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::DashboardProduct;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /v1/merchants/product
///
/// # Errors
///
/// Returns 404 if the caller owns no merchant.
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<ApiResponse<Vec<DashboardProduct>>> {
    let products = state.merchants().dashboard(user.id).await?;
    Ok(ApiResponse::ok("Success", products))
}
