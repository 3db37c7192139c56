//! Catalog product types.

use rust_decimal::Decimal;
use serde::Serialize;

use arvigo_core::{
    BrandId, CategoryId, MerchantId, ProductId, ProductImages, ProductStatus, TagId,
};

use super::StoreListing;

/// Which platform-owned products a catalog query returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter<'a> {
    /// Restrict to one category.
    pub category: Option<CategoryId>,
    /// Keep products carrying at least one of these detail tags.
    pub tags: Option<&'a [TagId]>,
}

/// The columns every product card is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub images: ProductImages,
}

/// A product in a list: one image and its tag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub image: String,
    pub tags: Vec<String>,
}

impl ProductCard {
    /// Card with the primary image and the given tag names.
    #[must_use]
    pub fn new(summary: ProductSummary, tags: Vec<String>) -> Self {
        let image = summary.images.primary().to_owned();
        Self {
            id: summary.id,
            name: summary.name,
            brand: summary.brand,
            image,
            tags,
        }
    }
}

/// A product row with its brand and category names.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub brand_name: Option<String>,
    pub category_name: Option<String>,
    pub merchant_id: Option<MerchantId>,
    pub images: ProductImages,
    pub status: ProductStatus,
    pub is_subscription_active: bool,
    pub rejected_note: String,
    pub link_external: String,
}

/// Full product page.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub brand_name: Option<String>,
    pub category_name: Option<String>,
    pub status: ProductStatus,
    pub is_subscription_active: bool,
    pub rejected_note: String,
    pub link_external: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub marketplaces: Vec<StoreListing>,
}

/// A product about to be inserted with its detail tags.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub brand_id: BrandId,
    pub category_id: CategoryId,
    /// `None` for platform-owned products.
    pub merchant_id: Option<MerchantId>,
    pub images: ProductImages,
    pub status: ProductStatus,
    pub tags: Vec<TagId>,
}

/// Replacement fields of a platform product; images and tags are replaced too.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub brand_id: BrandId,
    pub category_id: CategoryId,
    pub images: ProductImages,
    pub tags: Vec<TagId>,
}

/// A merchant's edit of its own product. Sends the product back to review.
#[derive(Debug, Clone)]
pub struct MerchantProductEdit {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// An admin decision on a merchant product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductReview {
    /// `Approved` or `Rejected`.
    pub status: ProductStatus,
    /// Reason shown to the merchant; `None` when approving.
    pub rejected_note: Option<String>,
}

/// A visible product as the recommendation service indexes it.
#[derive(Debug, Clone)]
pub struct ExportRecord {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub merchant: Option<String>,
    pub clicked: i64,
}

/// One entry of `GET /v1/product-recommendation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductExport {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Tag names joined with `,`.
    pub tags: String,
    pub merchant: Option<String>,
    pub clicked: i64,
}

impl ProductExport {
    #[must_use]
    pub fn new(record: ExportRecord, tags: &[String]) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            category: record.category,
            brand: record.brand,
            tags: tags.join(","),
            merchant: record.merchant,
            clicked: record.clicked,
        }
    }
}

/// Where a product can be bought, after counting the visit.
#[derive(Debug, Clone, Serialize)]
pub struct MarketplaceProduct {
    pub product_id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub image: String,
    pub price: Decimal,
    pub marketplaces: Vec<StoreListing>,
}
