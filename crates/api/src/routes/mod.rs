//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                - Liveness check
//! GET  /health/ready                          - Readiness check (database)
//!
//! # Auth
//! POST /v1/auth/login                         - Login, returns a bearer token
//! POST /v1/auth/register-user                 - Register a shopper
//! POST /v1/auth/register-partner              - Register a partner and its merchant
//! POST /v1/auth/update-user/{id}              - Edit profile fields
//!
//! # Home (bearer token)
//! GET  /v1/home                               - Face shape, personality and general picks
//! GET  /v1/home/search?search=                - Free-text search
//! GET  /v1/home/merchants                     - Merchant storefronts
//!
//! # Users and merchants (bearer token)
//! GET  /v1/users/me                           - Caller's profile
//! GET  /v1/merchants/product                  - Caller's merchant dashboard
//!
//! # Products (bearer token)
//! GET    /v1/products/initials/{id}             - Product page
//! PUT    /v1/products/initials/{id}             - Replace a platform product (multipart)
//! GET    /v1/products/initials/category/{id}    - Platform products of a category
//! GET    /v1/products/initials/marketplace/{id} - Count a visit, list where it is sold
//! POST   /v1/products/initials                  - Create a platform product (multipart)
//! POST   /v1/products/merchants                 - Create a merchant product (multipart)
//! PUT    /v1/products/merchants                 - Edit a merchant product
//! PUT    /v1/products/merchants/verify          - Approve or reject (admin)
//! DELETE /v1/products/{id}                      - Delete a product
//!
//! # Recommendation service (x-api-key)
//! GET  /v1/product-recommendation             - Visible products to index
//! ```
//!
//! Multipart routes accept bodies up to `MAX_UPLOAD_MB`; everything else
//! keeps axum's default limit.

pub mod auth;
pub mod home;
pub mod merchants;
pub mod products;
pub mod users;
mod validate;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register-user", post(auth::register_user))
        .route("/register-partner", post(auth::register_partner))
        .route("/update-user/{id}", post(auth::update_user))
}

/// Create the home routes router.
pub fn home_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/search", get(home::search))
        .route("/merchants", get(home::merchants))
}

/// Create the product routes router.
///
/// `max_body_bytes` bounds the multipart upload routes only.
pub fn product_routes(max_body_bytes: usize) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(max_body_bytes);

    Router::new()
        .route("/initials", post(products::create_initial).layer(upload_limit))
        .route(
            "/initials/{id}",
            put(products::update_initial)
                .layer(upload_limit)
                .get(products::show),
        )
        .route("/initials/category/{id}", get(products::by_category))
        .route("/initials/marketplace/{id}", get(products::marketplace))
        .route(
            "/merchants",
            post(products::create_for_merchant)
                .layer(upload_limit)
                .put(products::update_for_merchant),
        )
        .route("/merchants/verify", put(products::verify))
        .route("/{id}", delete(products::delete))
}

/// Create all `/v1` routes.
pub fn routes(max_body_bytes: usize) -> Router<AppState> {
    let v1 = Router::new()
        .nest("/auth", auth_routes())
        .nest("/home", home_routes())
        .nest("/products", product_routes(max_body_bytes))
        .route("/product-recommendation", get(products::recommendation_export))
        .route("/users/me", get(users::me))
        .route("/merchants/product", get(merchants::dashboard));

    Router::new().nest("/v1", v1)
}
