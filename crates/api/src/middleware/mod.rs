//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Bearer token checks are not a layer: protected handlers take the
//! [`AuthUser`] extractor, and the product export takes [`ApiKey`].

pub mod api_key;
pub mod auth;
pub mod request_id;

pub use api_key::ApiKey;
pub use auth::AuthUser;
pub use request_id::request_id_middleware;
