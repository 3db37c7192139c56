//! Login, registration and profile edit routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;

use arvigo_core::UserId;

use super::validate::{Validator, positive_id};
use crate::error::Result;
use crate::models::AuthToken;
use crate::response::{ApiJson, ApiResponse};
use crate::services::auth::{ProfileEdit, Registration};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Registration form data, shared by shoppers and partners.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    /// Partner registrations only.
    pub merchant_name: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<()> {
        Validator::new()
            .required("full_name", &self.full_name)
            .required("email", &self.email)
            .required("password", &self.password)
            .required("password_confirmation", &self.password_confirmation)
            .finish()
    }

    fn registration(&self) -> Registration<'_> {
        Registration {
            full_name: &self.full_name,
            email: &self.email,
            password: &self.password,
            password_confirmation: &self.password_confirmation,
        }
    }
}

/// Profile edit form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub full_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

/// POST /v1/auth/login
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown user and 401 for a
/// wrong password.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginRequest>,
) -> Result<ApiResponse<AuthToken>> {
    Validator::new()
        .required("email", &form.email)
        .required("password", &form.password)
        .required("role", &form.role)
        .finish()?;

    let token = state
        .auth()
        .login(&form.email, &form.password, form.role.trim())
        .await?;

    Ok(ApiResponse::ok("Login success", token))
}

/// POST /v1/auth/register-user
///
/// # Errors
///
/// Returns 400 for invalid fields or a password mismatch and 409 for a taken
/// email.
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<RegisterRequest>,
) -> Result<ApiResponse<AuthToken>> {
    form.validate()?;

    let token = state.auth().register_user(form.registration()).await?;

    Ok(ApiResponse::created("Created", token))
}

/// POST /v1/auth/register-partner
///
/// # Errors
///
/// As [`register_user`], plus 400 when `merchant_name` is missing.
pub async fn register_partner(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<RegisterRequest>,
) -> Result<ApiResponse<AuthToken>> {
    form.validate()?;
    Validator::new()
        .required("merchant_name", &form.merchant_name)
        .finish()?;

    let token = state
        .auth()
        .register_partner(form.registration(), &form.merchant_name)
        .await?;

    Ok(ApiResponse::created("Created", token))
}

/// POST /v1/auth/update-user/{id}
///
/// # Errors
///
/// Returns 400 for a bad id or fields and 404 for an unknown user.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(form): ApiJson<UpdateUserRequest>,
) -> Result<ApiResponse<()>> {
    let id = UserId::new(positive_id(&id, "Invalid user ID")?);
    Validator::new()
        .required("full_name", &form.full_name)
        .finish()?;

    let edit = ProfileEdit {
        full_name: form.full_name.trim().to_owned(),
        gender: form.gender,
        date_of_birth: form.date_of_birth,
        place_of_birth: form.place_of_birth,
        password: form.password,
        password_confirmation: form.password_confirmation,
    };
    state.auth().update_user(id, edit).await?;

    Ok(ApiResponse::message(StatusCode::OK, "Updated"))
}
