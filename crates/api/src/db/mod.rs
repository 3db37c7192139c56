//! Database operations for the Arvigo `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts of shoppers, partners and admins
//! - `user_personalities` - Personality results with their detail tag ids
//! - `merchants` - Seller entities owned by partner users
//! - `addresses` - Postal addresses of users and offline stores
//! - `brands`, `categories` - Catalog dimensions
//! - `products` - Platform-owned and merchant products
//! - `detail_product_tags` - Product to detail tag join rows
//! - `detail_product_marketplaces` - Online and offline listings of a product
//! - `detail_user_subscriptions` - Paid subscription periods
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and applied with:
//! ```bash
//! sqlx migrate run --source crates/api/migrations
//! ```
//!
//! Handlers and services talk to the traits in [`ports`]; the repositories
//! here are their `PostgreSQL` implementations.

pub mod addresses;
pub mod catalog;
pub mod merchants;
pub mod ports;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use catalog::CatalogRepository;
pub use merchants::MerchantRepository;
pub use ports::{AddressLookup, CatalogStore, MerchantStore, UserStore};
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// The `PostgreSQL` implementations of every repository port.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub merchants: Arc<dyn MerchantStore>,
    pub addresses: Arc<dyn AddressLookup>,
}

impl Repositories {
    /// Repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            catalog: Arc::new(CatalogRepository::new(pool.clone())),
            merchants: Arc::new(MerchantRepository::new(pool.clone())),
            addresses: Arc::new(AddressRepository::new(pool.clone())),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
