//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] arvigo_core::EmailError),

    /// Wrong password for an existing user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No user with this email and role (or the role is unknown).
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("password doesn't match")]
    PasswordMismatch,

    /// A role the catalog tables must define is missing.
    #[error("role not configured: {0}")]
    RoleNotConfigured(arvigo_core::Role),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token signing error.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
