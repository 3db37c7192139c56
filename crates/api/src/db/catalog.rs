//! Catalog repository: products, detail tags and marketplace listings.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use arvigo_core::{
    AddressId, Channel, ListingId, MarketplaceId, MerchantId, ProductId, ProductImages,
    ProductStatus, TagId,
};

use super::{CatalogStore, RepositoryError};
use crate::models::{
    ExportRecord, ListingRecord, MerchantProductEdit, NewProduct, ProductFilter, ProductRecord,
    ProductReview, ProductSummary, ProductUpdate,
};

/// Repository for catalog database operations.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    name: String,
    brand: Option<String>,
    images: String,
}

impl From<SummaryRow> for ProductSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            brand: row.brand,
            images: ProductImages::new(row.images),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: Decimal,
    brand_name: Option<String>,
    category_name: Option<String>,
    merchant_id: Option<i64>,
    images: String,
    status: String,
    is_subscription_active: bool,
    rejected_note: String,
    link_external: String,
}

impl TryFrom<ProductRow> for ProductRecord {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ProductStatus>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            brand_name: row.brand_name,
            category_name: row.category_name,
            merchant_id: MerchantId::from_column(row.merchant_id),
            images: ProductImages::new(row.images),
            status,
            is_subscription_active: row.is_subscription_active,
            rejected_note: row.rejected_note,
            link_external: row.link_external,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ExportRow {
    id: i64,
    name: String,
    description: String,
    category: Option<String>,
    brand: Option<String>,
    merchant: Option<String>,
    clicked: i64,
}

impl From<ExportRow> for ExportRecord {
    fn from(row: ExportRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            category: row.category,
            brand: row.brand,
            merchant: row.merchant,
            clicked: row.clicked,
        }
    }
}

/// A `detail_product_marketplaces` row joined with its product.
#[derive(sqlx::FromRow)]
pub(super) struct ListingRow {
    id: i64,
    name: String,
    brand: Option<String>,
    images: String,
    price: Decimal,
    merchant: Option<String>,
    marketplace_link: Option<String>,
    marketplace_id: Option<i64>,
    addresses_id: Option<i64>,
    is_subscription_active: bool,
}

impl From<ListingRow> for ListingRecord {
    fn from(row: ListingRow) -> Self {
        let address_id = AddressId::from_column(row.addresses_id);
        let marketplace_id = MarketplaceId::from_column(row.marketplace_id);
        if address_id.is_some() && marketplace_id.is_some() {
            tracing::warn!(
                listing_id = row.id,
                "Listing has both an address and a marketplace, treating it as offline"
            );
        }

        Self {
            id: ListingId::new(row.id),
            name: row.name,
            brand: row.brand,
            images: ProductImages::new(row.images),
            price: row.price,
            merchant: row.merchant,
            link: row.marketplace_link,
            channel: Channel::classify(address_id, marketplace_id),
            is_subscription_active: row.is_subscription_active,
        }
    }
}

/// Columns selected by every listing query; the caller supplies the `WHERE`.
pub(super) const LISTING_SELECT: &str = r"
    SELECT dpm.id,
           p.name,
           b.name AS brand,
           COALESCE(p.images, '') AS images,
           p.price,
           m.name AS merchant,
           dpm.link AS marketplace_link,
           dpm.marketplace_id,
           dpm.addresses_id,
           p.is_subscription_active
    FROM detail_product_marketplaces dpm
    JOIN products p ON p.id = dpm.product_id
    LEFT JOIN brands b ON b.id = p.brand_id
    LEFT JOIN merchants m ON m.id = p.merchant_id
";

async fn insert_tags(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product: i64,
    tags: &[TagId],
) -> Result<(), RepositoryError> {
    if tags.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r"
        INSERT INTO detail_product_tags (product_id, tag_id)
        SELECT $1, tag_id FROM UNNEST($2::BIGINT[]) AS t(tag_id)
        ",
    )
    .bind(product)
    .bind(tags.iter().map(TagId::as_i64).collect::<Vec<_>>())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    #[instrument(skip(self, filter), fields(category = ?filter.category))]
    async fn platform_products(
        &self,
        filter: ProductFilter<'_>,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let tags = filter
            .tags
            .map(|tags| tags.iter().map(TagId::as_i64).collect::<Vec<_>>());

        let rows = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT p.id, p.name, b.name AS brand, COALESCE(p.images, '') AS images
            FROM products p
            LEFT JOIN brands b ON b.id = p.brand_id
            WHERE COALESCE(p.merchant_id, 0) = 0
              AND ($1::BIGINT IS NULL OR p.category_id = $1)
              AND ($2::BIGINT[] IS NULL OR EXISTS (
                    SELECT 1
                    FROM detail_product_tags dpt
                    WHERE dpt.product_id = p.id AND dpt.tag_id = ANY($2)
                  ))
            ORDER BY p.id
            ",
        )
        .bind(filter.category.map(|c| c.as_i64()))
        .bind(tags)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductSummary::from).collect())
    }

    #[instrument(skip(self), fields(product_id = %product))]
    async fn product_tag_ids(&self, product: ProductId) -> Result<Vec<TagId>, RepositoryError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT tag_id FROM detail_product_tags WHERE product_id = $1 ORDER BY id",
        )
        .bind(product.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(TagId::new).collect())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT p.id, p.name, b.name AS brand, COALESCE(p.images, '') AS images
            FROM products p
            LEFT JOIN brands b ON b.id = p.brand_id
            WHERE p.id = ANY($1)
            ",
        )
        .bind(ids.iter().map(ProductId::as_i64).collect::<Vec<_>>())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductSummary::from).collect())
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Option<ProductRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id,
                   p.name,
                   COALESCE(p.description, '') AS description,
                   p.price,
                   b.name AS brand_name,
                   c.name AS category_name,
                   p.merchant_id,
                   COALESCE(p.images, '') AS images,
                   p.status,
                   p.is_subscription_active,
                   COALESCE(p.rejected_note, '') AS rejected_note,
                   COALESCE(p.link_external, '') AS link_external
            FROM products p
            LEFT JOIN brands b ON b.id = p.brand_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.id = $1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRecord::try_from).transpose()
    }

    #[instrument(skip(self), fields(product_id = %product))]
    async fn product_listings(
        &self,
        product: ProductId,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        let sql = format!("{LISTING_SELECT} WHERE dpm.product_id = $1 ORDER BY dpm.id");
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(product.as_i64())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ListingRecord::from).collect())
    }

    #[instrument(skip(self, product), fields(status = %product.status))]
    async fn create_product(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO products
                (name, description, price, brand_id, category_id, merchant_id, images, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.brand_id.as_i64())
        .bind(product.category_id.as_i64())
        .bind(product.merchant_id.map(|m| m.as_i64()))
        .bind(product.images.as_str())
        .bind(product.status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        insert_tags(&mut tx, id, &product.tags).await?;

        tx.commit().await?;

        Ok(ProductId::new(id))
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM detail_product_tags WHERE product_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM detail_product_marketplaces WHERE product_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(deleted > 0)
    }

    #[instrument(skip(self, update), fields(product_id = %id))]
    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<ProductImages>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> = sqlx::query_scalar(
            "SELECT COALESCE(images, '') FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };

        sqlx::query(
            r"
            UPDATE products
            SET name = $2, description = $3, price = $4, brand_id = $5, category_id = $6,
                images = $7, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i64())
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.price)
        .bind(update.brand_id.as_i64())
        .bind(update.category_id.as_i64())
        .bind(update.images.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM detail_product_tags WHERE product_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        insert_tags(&mut tx, id.as_i64(), &update.tags).await?;

        tx.commit().await?;

        Ok(Some(ProductImages::new(previous)))
    }

    #[instrument(skip(self, edit), fields(merchant_id = %merchant, product_id = %id))]
    async fn update_merchant_product(
        &self,
        merchant: MerchantId,
        id: ProductId,
        edit: &MerchantProductEdit,
    ) -> Result<bool, RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE products
            SET name = $3, description = $4, price = $5, status = $6, rejected_note = NULL,
                updated_at = NOW()
            WHERE id = $1 AND merchant_id = $2
            ",
        )
        .bind(id.as_i64())
        .bind(merchant.as_i64())
        .bind(&edit.name)
        .bind(&edit.description)
        .bind(edit.price)
        .bind(ProductStatus::Pending.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    #[instrument(skip(self, review), fields(product_id = %id, status = %review.status))]
    async fn review_product(
        &self,
        id: ProductId,
        review: &ProductReview,
    ) -> Result<bool, RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE products
            SET status = $2, rejected_note = $3, updated_at = NOW()
            WHERE id = $1 AND merchant_id IS NOT NULL
            ",
        )
        .bind(id.as_i64())
        .bind(review.status.as_str())
        .bind(review.rejected_note.as_deref())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn record_click(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let updated = sqlx::query("UPDATE products SET clicked = clicked + 1 WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }

    #[instrument(skip(self))]
    async fn export_products(&self) -> Result<Vec<ExportRecord>, RepositoryError> {
        let visible: Vec<&str> = ProductStatus::VISIBLE.iter().map(|s| s.as_str()).collect();
        let rows = sqlx::query_as::<_, ExportRow>(
            r"
            SELECT p.id,
                   p.name,
                   COALESCE(p.description, '') AS description,
                   c.name AS category,
                   b.name AS brand,
                   m.name AS merchant,
                   p.clicked
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            LEFT JOIN brands b ON b.id = p.brand_id
            LEFT JOIN merchants m ON m.id = p.merchant_id
            WHERE p.status = ANY($1)
            ORDER BY p.id
            ",
        )
        .bind(visible)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ExportRecord::from).collect())
    }
}
