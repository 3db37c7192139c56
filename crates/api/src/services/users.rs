//! The signed-in user's profile.

use chrono::Utc;
use tracing::instrument;

use arvigo_core::{CatalogTables, UserId};

use super::ServiceError;
use crate::db::{AddressLookup, UserStore};
use crate::models::UserProfile;

/// Profile service.
pub struct UserService<'a> {
    users: &'a dyn UserStore,
    addresses: &'a dyn AddressLookup,
    tables: &'a CatalogTables,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(
        users: &'a dyn UserStore,
        addresses: &'a dyn AddressLookup,
        tables: &'a CatalogTables,
    ) -> Self {
        Self {
            users,
            addresses,
            tables,
        }
    }

    /// Profile of a user, with names resolved and subscription state computed now.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown user and
    /// `ServiceError::Repository` if a query, including the address, fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn profile(&self, id: UserId) -> Result<UserProfile, ServiceError> {
        let record = self
            .users
            .profile(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_owned()))?;

        let address = match record.address_id {
            Some(address_id) => self.addresses.address(address_id).await?,
            None => None,
        };

        let now = Utc::now();
        let is_subscription_active = record.subscriptions.iter().any(|s| s.is_active(now));

        Ok(UserProfile {
            id: record.id,
            email: record.email,
            role_id: record.role_id,
            role_name: self.tables.role_name(record.role_id).map(str::to_owned),
            full_name: record.full_name,
            gender: record.gender,
            date_of_birth: record.date_of_birth,
            place_of_birth: record.place_of_birth,
            is_complete_personality_test: record.is_complete_personality_test,
            is_complete_face_test: record.is_complete_face_test,
            is_subscription_active,
            face_shape: record
                .face_shape
                .and_then(|shape| self.tables.face_shape_name(shape))
                .map(str::to_owned),
            personality_type: record.personality_type,
            is_verified: record.is_verified,
            avatar: record.avatar,
            addresses_id: record.address_id,
            merchant_id: record.merchant_id,
            address,
        })
    }
}
