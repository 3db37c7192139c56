//! Authentication service.
//!
//! Password login and registration for shoppers and partners, issuing HS256
//! bearer tokens.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenKeys};

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use chrono::NaiveDate;
use tracing::instrument;

use arvigo_core::{CatalogTables, Email, Role, RoleId, UserId};

use crate::db::{RepositoryError, UserStore};
use crate::models::{AuthToken, NewUser, UserUpdate};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Fields of a registration request.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'r> {
    pub full_name: &'r str,
    pub email: &'r str,
    pub password: &'r str,
    pub password_confirmation: &'r str,
}

/// Fields of a profile update request.
#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub full_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    tables: &'a CatalogTables,
    tokens: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        users: &'a dyn UserStore,
        tables: &'a CatalogTables,
        tokens: &'a TokenKeys,
    ) -> Self {
        Self {
            users,
            tables,
            tokens,
        }
    }

    /// Login with email, password and role name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the role is unknown or no user has
    /// this email and role.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    /// Returns `AuthError::PasswordHash` if the stored hash cannot be checked.
    #[instrument(skip(self, email, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<AuthToken, AuthError> {
        let email = Email::parse(email)?;
        let role_id = self.tables.role_id(role).ok_or(AuthError::UserNotFound)?;

        let user = self
            .users
            .find_for_login(&email, role_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password, &user.password_hash)?;

        let token = self.tokens.issue(user.id, user.role_id, &user.full_name)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthToken {
            user_id: user.id,
            token,
        })
    }

    /// Register a shopper account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` before touching anything else if
    /// the trimmed password and confirmation differ.
    /// Returns `AuthError::InvalidEmail` or `AuthError::WeakPassword` for bad input.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, registration))]
    pub async fn register_user(
        &self,
        registration: Registration<'_>,
    ) -> Result<AuthToken, AuthError> {
        let user = self.new_user(registration, Role::Mobile)?;

        let user_id = self.users.create(&user).await.map_err(conflict_as_exists)?;
        tracing::info!(user_id = %user_id, "Shopper registered");

        self.token_for(user_id, &user)
    }

    /// Register a partner account together with its merchant.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register_user`].
    #[instrument(skip(self, registration))]
    pub async fn register_partner(
        &self,
        registration: Registration<'_>,
        merchant_name: &str,
    ) -> Result<AuthToken, AuthError> {
        let user = self.new_user(registration, Role::Partner)?;

        let (user_id, merchant_id) = self
            .users
            .create_partner(merchant_name.trim(), &user)
            .await
            .map_err(conflict_as_exists)?;
        tracing::info!(user_id = %user_id, merchant_id = %merchant_id, "Partner registered");

        self.token_for(user_id, &user)
    }

    /// Update a user's profile and, optionally, password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` or `AuthError::WeakPassword` for a
    /// bad new password, `AuthError::UserNotFound` for an unknown id.
    #[instrument(skip(self, edit), fields(user_id = %id))]
    pub async fn update_user(&self, id: UserId, edit: ProfileEdit) -> Result<(), AuthError> {
        let password_hash = match edit.password.as_deref() {
            Some(password) if !password.is_empty() => {
                let confirmation = edit.password_confirmation.as_deref().unwrap_or_default();
                check_confirmation(password, confirmation)?;
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            _ => None,
        };

        let update = UserUpdate {
            full_name: edit.full_name,
            gender: edit.gender,
            date_of_birth: edit.date_of_birth,
            place_of_birth: edit.place_of_birth,
            password_hash,
        };

        if self.users.update(id, &update).await? {
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }

    /// Validate a registration and hash its password.
    fn new_user(&self, registration: Registration<'_>, role: Role) -> Result<NewUser, AuthError> {
        check_confirmation(registration.password, registration.password_confirmation)?;

        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;
        let role_id = self.role_id(role)?;
        let password_hash = hash_password(registration.password)?;

        Ok(NewUser {
            email,
            password_hash,
            full_name: registration.full_name.trim().to_owned(),
            role_id,
        })
    }

    fn role_id(&self, role: Role) -> Result<RoleId, AuthError> {
        self.tables
            .role_id_of(role)
            .ok_or(AuthError::RoleNotConfigured(role))
    }

    fn token_for(&self, user_id: UserId, user: &NewUser) -> Result<AuthToken, AuthError> {
        let token = self.tokens.issue(user_id, user.role_id, &user.full_name)?;
        Ok(AuthToken { user_id, token })
    }
}

fn conflict_as_exists(err: RepositoryError) -> AuthError {
    match err {
        RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        other => AuthError::Repository(other),
    }
}

/// Password and confirmation must agree once surrounding whitespace is removed.
fn check_confirmation(password: &str, confirmation: &str) -> Result<(), AuthError> {
    if password.trim() == confirmation.trim() {
        Ok(())
    } else {
        Err(AuthError::PasswordMismatch)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// A mismatch is `InvalidCredentials`; a hash that cannot be parsed or
/// checked is `PasswordHash`.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        tracing::error!(error = %e, "Stored password hash is malformed");
        AuthError::PasswordHash
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|e| match e {
            password_hash::Error::Password => AuthError::InvalidCredentials,
            _ => AuthError::PasswordHash,
        })
}
