//! Merchant storefront and dashboard types.

use rust_decimal::Decimal;
use serde::Serialize;

use arvigo_core::{AddressId, MerchantId, ProductId, ProductImages, ProductStatus};

use super::StoreListing;

/// A user account that owns a merchant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontOwner {
    pub merchant_id: MerchantId,
    pub merchant_name: String,
    pub address_id: Option<AddressId>,
}

/// A merchant's public storefront.
#[derive(Debug, Clone, Serialize)]
pub struct MerchantStorefront {
    pub merchant_id: MerchantId,
    pub merchant_name: String,
    /// Empty when the owner's address is unknown.
    pub location: String,
    pub products: Vec<StoreListing>,
}

/// A merchant product row for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRecord {
    pub id: ProductId,
    pub name: String,
    pub images: ProductImages,
    pub price: Decimal,
    pub status: ProductStatus,
    pub clicked: i64,
    pub rejected_note: String,
}

/// A product on the merchant dashboard, with every image.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardProduct {
    pub id: ProductId,
    pub name: String,
    pub images: Vec<String>,
    pub price: Decimal,
    pub status: ProductStatus,
    pub clicked: i64,
    pub rejected_note: String,
    pub marketplaces: Vec<StoreListing>,
}
