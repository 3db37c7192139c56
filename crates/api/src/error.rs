//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error is rendered as the JSON envelope with `"data": null`.

use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::{Envelope, FieldError};
use crate::services::ServiceError;
use crate::services::auth::AuthError;

/// Message of every validation failure.
pub const VALIDATION_MESSAGE: &str = "The data is not valid";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request fields failed validation.
    #[error("The data is not valid")]
    Validation(Vec<FieldError>),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or rejected credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to do this.
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// Request body over the route's limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Catalog, home, search or merchant operation failed.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

impl AppError {
    /// Status code and client-facing message. Internal details stay hidden.
    fn status_and_message(&self) -> (StatusCode, String) {
        const INTERNAL: &str = "Internal server error";

        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, VALIDATION_MESSAGE.to_owned()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            Self::Database(RepositoryError::Conflict(msg)) => (StatusCode::CONFLICT, msg.clone()),
            Self::Database(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned())
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Invalid credentials".to_owned())
                }
                AuthError::UserNotFound => (StatusCode::NOT_FOUND, err.to_string()),
                AuthError::UserAlreadyExists => (
                    StatusCode::CONFLICT,
                    "An account with this email already exists".to_owned(),
                ),
                AuthError::PasswordMismatch => (StatusCode::BAD_REQUEST, err.to_string()),
                AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => {
                    (StatusCode::BAD_REQUEST, VALIDATION_MESSAGE.to_owned())
                }
                AuthError::RoleNotConfigured(_)
                | AuthError::Repository(_)
                | AuthError::PasswordHash
                | AuthError::Token(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned()),
            },
            Self::Service(err) => match err {
                ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                ServiceError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                ServiceError::Repository(_)
                | ServiceError::Recommender(_)
                | ServiceError::Storage(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned())
                }
            },
        }
    }

    /// Field errors shown under `errors`, if any.
    fn field_errors(&self) -> Option<Vec<FieldError>> {
        match self {
            Self::Validation(errors) => Some(errors.clone()),
            Self::Auth(AuthError::InvalidEmail(e)) => {
                Some(vec![FieldError::new("email", e.to_string())])
            }
            Self::Auth(AuthError::WeakPassword(msg)) => {
                Some(vec![FieldError::new("password", msg.clone())])
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let errors = self.field_errors();
        let body = Envelope::<()> {
            message: &message,
            data: None,
            errors: errors.as_deref(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::debug!(error = %err, "Multipart body rejected");
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge("Upload is too large".to_owned())
        } else {
            Self::BadRequest("Failed to parse form data".to_owned())
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Multipart request rejected");
        Self::BadRequest("Failed to parse form data".to_owned())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}
