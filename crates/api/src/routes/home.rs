//! Home screen routes: recommendations, search and merchant storefronts.

use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::{MerchantStorefront, ProductCard};
use crate::response::ApiResponse;
use crate::services::{HomeFeed, SearchOutcome};
use crate::state::AppState;

/// Query parameters of the search endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub search: String,
}

/// GET /v1/home
///
/// # Errors
///
/// Returns 404 if the token's user no longer exists and 500 if a query fails.
pub async fn home(State(state): State<AppState>, user: AuthUser) -> Result<ApiResponse<HomeFeed>> {
    let feed = state.home().home(user.id).await?;
    Ok(ApiResponse::ok("Success", feed))
}

/// GET /v1/home/search?search=
///
/// No matches is a 404 carrying an empty list.
///
/// # Errors
///
/// Returns 400 for a blank query and 500 if the recommendation service or
/// the product query fails.
pub async fn search(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<ApiResponse<Vec<ProductCard>>> {
    match state.search().search(&params.search).await? {
        SearchOutcome::NoMatches => Ok(ApiResponse::with_status(
            StatusCode::NOT_FOUND,
            "Product not found",
            Some(Vec::new()),
        )),
        SearchOutcome::Found(products) => Ok(ApiResponse::ok("Success", products)),
    }
}

/// GET /v1/home/merchants
///
/// # Errors
///
/// Returns 500 if a query fails.
pub async fn merchants(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<ApiResponse<Vec<MerchantStorefront>>> {
    let storefronts = state.merchants().storefronts().await?;
    Ok(ApiResponse::ok("Success", storefronts))
}
