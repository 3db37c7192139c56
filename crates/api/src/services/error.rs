//! Errors shared by the catalog, home, search and merchant services.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::recommender::RecommenderError;
use crate::uploads::ImageStoreError;

/// Errors that can occur in the read and catalog services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request cannot be served as given.
    #[error("{0}")]
    BadRequest(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// The recommendation service failed.
    #[error("recommender error: {0}")]
    Recommender(#[from] RecommenderError),

    /// An uploaded image could not be stored.
    #[error("image storage error: {0}")]
    Storage(#[from] ImageStoreError),
}
