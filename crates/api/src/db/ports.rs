//! Storage traits the services depend on.
//!
//! Each trait is implemented once for `PostgreSQL` and once in memory by the
//! test fixtures.

use async_trait::async_trait;

use arvigo_core::{AddressId, Email, MerchantId, ProductId, ProductImages, RoleId, TagId, UserId};

use super::RepositoryError;
use crate::models::{
    Address, DashboardRecord, ExportRecord, ListingRecord, LoginRecord, MerchantProductEdit,
    NewProduct, NewUser, ProductFilter, ProductRecord, ProductReview, ProductSummary,
    ProductUpdate, ProfileRecord, RecommendationProfile, StorefrontOwner, UserUpdate,
};

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// The user with this email and role, if any.
    async fn find_for_login(
        &self,
        email: &Email,
        role_id: RoleId,
    ) -> Result<Option<LoginRecord>, RepositoryError>;

    /// Insert a user. A taken email is `RepositoryError::Conflict`.
    async fn create(&self, user: &NewUser) -> Result<UserId, RepositoryError>;

    /// Insert a merchant and the partner user owning it, atomically.
    async fn create_partner(
        &self,
        merchant_name: &str,
        user: &NewUser,
    ) -> Result<(UserId, MerchantId), RepositoryError>;

    /// Apply profile edits. Returns `false` if the user does not exist.
    async fn update(&self, id: UserId, update: &UserUpdate) -> Result<bool, RepositoryError>;

    /// Completion flags and tag ids driving the home feed.
    async fn recommendation_profile(
        &self,
        id: UserId,
    ) -> Result<Option<RecommendationProfile>, RepositoryError>;

    /// Everything `GET /v1/users/me` shows.
    async fn profile(&self, id: UserId) -> Result<Option<ProfileRecord>, RepositoryError>;

    /// The merchant a user owns, if any.
    async fn merchant_of(&self, id: UserId) -> Result<Option<MerchantId>, RepositoryError>;
}

/// Products, their tags and listings.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Platform-owned products matching the filter, one entry per product.
    async fn platform_products(
        &self,
        filter: ProductFilter<'_>,
    ) -> Result<Vec<ProductSummary>, RepositoryError>;

    /// Detail tag ids of a product.
    async fn product_tag_ids(&self, product: ProductId) -> Result<Vec<TagId>, RepositoryError>;

    /// Products with the given ids, in no particular order.
    async fn products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductSummary>, RepositoryError>;

    /// One product with brand and category names.
    async fn product(&self, id: ProductId) -> Result<Option<ProductRecord>, RepositoryError>;

    /// Marketplace listings of a product.
    async fn product_listings(
        &self,
        product: ProductId,
    ) -> Result<Vec<ListingRecord>, RepositoryError>;

    /// Insert a product and its detail tags atomically.
    async fn create_product(&self, product: &NewProduct) -> Result<ProductId, RepositoryError>;

    /// Delete a product with its tags and listings. Returns `false` if absent.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Replace a product's fields, images and detail tags atomically.
    ///
    /// Returns the images it had before, or `None` if the product is absent.
    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<ProductImages>, RepositoryError>;

    /// Edit a product owned by `merchant` and move it back to `pending`.
    /// Returns `false` if the merchant has no such product.
    async fn update_merchant_product(
        &self,
        merchant: MerchantId,
        id: ProductId,
        edit: &MerchantProductEdit,
    ) -> Result<bool, RepositoryError>;

    /// Record a review decision on a merchant product. Returns `false` if
    /// there is no merchant product with this id.
    async fn review_product(
        &self,
        id: ProductId,
        review: &ProductReview,
    ) -> Result<bool, RepositoryError>;

    /// Count one visit of a product page. Returns `false` if absent.
    async fn record_click(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Approved and subscribed products for the recommendation index.
    async fn export_products(&self) -> Result<Vec<ExportRecord>, RepositoryError>;
}

/// Merchant storefronts and dashboards.
#[async_trait]
pub trait MerchantStore: Send + Sync {
    /// Every user that owns a merchant.
    async fn storefront_owners(&self) -> Result<Vec<StorefrontOwner>, RepositoryError>;

    /// Listings of a merchant's approved and subscribed products, in database order.
    async fn storefront_listings(
        &self,
        merchant: MerchantId,
    ) -> Result<Vec<ListingRecord>, RepositoryError>;

    /// All products of a merchant, whatever their status.
    async fn dashboard_products(
        &self,
        merchant: MerchantId,
    ) -> Result<Vec<DashboardRecord>, RepositoryError>;
}

/// Address resolution.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn address(&self, id: AddressId) -> Result<Option<Address>, RepositoryError>;
}
