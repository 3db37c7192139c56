//! Address lookups.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use arvigo_core::AddressId;

use super::{AddressLookup, RepositoryError};
use crate::models::Address;

/// Repository for address database operations.
#[derive(Clone)]
pub struct AddressRepository {
    pool: PgPool,
}

impl AddressRepository {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    street: String,
    province: String,
    city: String,
    district: String,
    sub_district: String,
    postal_code: String,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            street: row.street,
            province: row.province,
            city: row.city,
            district: row.district,
            sub_district: row.sub_district,
            postal_code: row.postal_code,
        }
    }
}

#[async_trait]
impl AddressLookup for AddressRepository {
    #[instrument(skip(self), fields(address_id = %id))]
    async fn address(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT COALESCE(street, '') AS street,
                   COALESCE(province, '') AS province,
                   COALESCE(city, '') AS city,
                   COALESCE(district, '') AS district,
                   COALESCE(sub_district, '') AS sub_district,
                   COALESCE(postal_code, '') AS postal_code
            FROM addresses
            WHERE id = $1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Address::from))
    }
}
