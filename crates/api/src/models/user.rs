//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::NaiveDate;
use serde::Serialize;

use arvigo_core::{AddressId, Email, FaceShapeId, MerchantId, RoleId, TagId, UserId};

use super::{Address, Subscription};

/// The columns login needs to check a password and sign a token.
#[derive(Debug, Clone)]
pub struct LoginRecord {
    pub id: UserId,
    pub role_id: RoleId,
    pub full_name: String,
    /// PHC-formatted argon2 hash.
    pub password_hash: String,
}

/// A user about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub full_name: String,
    pub role_id: RoleId,
}

/// Editable profile fields. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub full_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub password_hash: Option<String>,
}

/// What the home feed needs to know about a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationProfile {
    pub is_complete_face_test: bool,
    pub is_complete_personality_test: bool,
    pub face_shape: Option<FaceShapeId>,
    /// Tag ids of the user's personality result, in stored order.
    pub personality_tags: Vec<TagId>,
}

/// A user row joined with its personality name and subscriptions.
#[derive(Debug, Clone)]
pub struct ProfileRecord {
    pub id: UserId,
    pub email: Email,
    pub role_id: RoleId,
    pub full_name: String,
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: String,
    pub is_complete_personality_test: bool,
    pub is_complete_face_test: bool,
    pub face_shape: Option<FaceShapeId>,
    pub personality_type: Option<String>,
    pub is_verified: bool,
    pub avatar: String,
    pub address_id: Option<AddressId>,
    pub merchant_id: Option<MerchantId>,
    pub subscriptions: Vec<Subscription>,
}

/// Profile returned by `GET /v1/users/me`.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub role_id: RoleId,
    pub role_name: Option<String>,
    pub full_name: String,
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: String,
    pub is_complete_personality_test: bool,
    pub is_complete_face_test: bool,
    pub is_subscription_active: bool,
    pub face_shape: Option<String>,
    pub personality_type: Option<String>,
    pub is_verified: bool,
    pub avatar: String,
    pub addresses_id: Option<AddressId>,
    pub merchant_id: Option<MerchantId>,
    pub address: Option<Address>,
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    pub user_id: UserId,
    pub token: String,
}
