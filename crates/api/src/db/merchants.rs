//! Merchant repository: storefront owners, listings and dashboard products.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use arvigo_core::{AddressId, MerchantId, ProductId, ProductImages, ProductStatus};

use super::catalog::{LISTING_SELECT, ListingRow};
use super::{MerchantStore, RepositoryError};
use crate::models::{DashboardRecord, ListingRecord, StorefrontOwner};

/// Repository for merchant database operations.
#[derive(Clone)]
pub struct MerchantRepository {
    pool: PgPool,
}

impl MerchantRepository {
    /// Create a new merchant repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OwnerRow {
    merchant_id: i64,
    merchant_name: String,
    addresses_id: Option<i64>,
}

impl From<OwnerRow> for StorefrontOwner {
    fn from(row: OwnerRow) -> Self {
        Self {
            merchant_id: MerchantId::new(row.merchant_id),
            merchant_name: row.merchant_name,
            address_id: AddressId::from_column(row.addresses_id),
        }
    }
}

#[derive(sqlx::FromRow)]
struct DashboardRow {
    id: i64,
    name: String,
    images: String,
    price: Decimal,
    status: String,
    clicked: i64,
    rejected_note: String,
}

impl TryFrom<DashboardRow> for DashboardRecord {
    type Error = RepositoryError;

    fn try_from(row: DashboardRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ProductStatus>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            images: ProductImages::new(row.images),
            price: row.price,
            status,
            clicked: row.clicked,
            rejected_note: row.rejected_note,
        })
    }
}

#[async_trait]
impl MerchantStore for MerchantRepository {
    #[instrument(skip(self))]
    async fn storefront_owners(&self) -> Result<Vec<StorefrontOwner>, RepositoryError> {
        let rows = sqlx::query_as::<_, OwnerRow>(
            r"
            SELECT m.id AS merchant_id, m.name AS merchant_name, u.addresses_id
            FROM users u
            JOIN merchants m ON m.id = u.merchant_id
            WHERE COALESCE(u.merchant_id, 0) <> 0
            ORDER BY u.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StorefrontOwner::from).collect())
    }

    #[instrument(skip(self), fields(merchant_id = %merchant))]
    async fn storefront_listings(
        &self,
        merchant: MerchantId,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        let sql = format!(
            "{LISTING_SELECT} WHERE p.merchant_id = $1 AND p.status = ANY($2) ORDER BY dpm.id"
        );
        let visible: Vec<&str> = ProductStatus::VISIBLE.iter().map(|s| s.as_str()).collect();

        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(merchant.as_i64())
            .bind(visible)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ListingRecord::from).collect())
    }

    #[instrument(skip(self), fields(merchant_id = %merchant))]
    async fn dashboard_products(
        &self,
        merchant: MerchantId,
    ) -> Result<Vec<DashboardRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, DashboardRow>(
            r"
            SELECT id,
                   name,
                   COALESCE(images, '') AS images,
                   price,
                   status,
                   clicked,
                   COALESCE(rejected_note, '') AS rejected_note
            FROM products
            WHERE merchant_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(merchant.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DashboardRecord::try_from).collect()
    }
}
