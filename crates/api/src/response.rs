//! The JSON envelope every endpoint answers with.
//!
//! ```json
//! {"message": "Success", "data": {...}}
//! {"message": "The data is not valid", "data": null, "errors": [{"field": "email", "message": "..."}]}
//! ```

use std::borrow::Cow;

use axum::{
    Json,
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// A single field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Wire shape of the envelope.
#[derive(Serialize)]
pub(crate) struct Envelope<'a, T> {
    pub message: &'a str,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a [FieldError]>,
}

/// A successful (or deliberately empty) response.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    message: Cow<'static, str>,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Response with an explicit status.
    pub fn with_status(
        status: StatusCode,
        message: impl Into<Cow<'static, str>>,
        data: Option<T>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    /// 200 with data.
    pub fn ok(message: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    /// 201 with data.
    pub fn created(message: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }
}

impl ApiResponse<()> {
    /// Status and message with `"data": null`.
    pub fn message(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_status(status, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            message: &self.message,
            data: self.data,
            errors: None,
        };
        (self.status, Json(body)).into_response()
    }
}

/// `Json` extractor whose rejections use the envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
