//! Request field checks shared by the handlers.

use crate::error::AppError;
use crate::response::FieldError;

/// Collects field errors, then fails the request if there were any.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `value` must contain something other than whitespace.
    #[must_use]
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.errors
                .push(FieldError::new(field, format!("{field} is required")));
        }
        self
    }

    /// Add a custom failure when `ok` is false.
    #[must_use]
    pub fn check(mut self, ok: bool, field: &str, message: &str) -> Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every failed field.
    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// A positive numeric id from a path segment.
///
/// # Errors
///
/// Returns `AppError::BadRequest` with `message` for zero, negative or
/// non-numeric input.
pub fn positive_id(raw: &str, message: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest(message.to_owned()))
}
