//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password login, registration and profile edits, JWT issuing
//! - `home` - Face shape, personality and general recommendations
//! - `search` - Free-text search through the recommendation service
//! - `merchants` - Public storefronts and the merchant dashboard
//! - `catalog` - Product pages, category lists, product creation and deletion
//! - `users` - The signed-in user's profile
//!
//! Services borrow the repository ports and lookup tables from
//! [`crate::state::AppState`] for the duration of one request.

pub mod auth;
pub mod catalog;
mod error;
pub mod home;
mod listings;
pub mod merchants;
pub mod search;
pub mod users;

#[cfg(test)]
pub(crate) mod fakes;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use error::ServiceError;
pub use home::{HomeFeed, HomeService};
pub use merchants::MerchantService;
pub use search::{SearchOutcome, SearchService};
pub use users::UserService;
