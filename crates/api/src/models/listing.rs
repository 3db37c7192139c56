//! Marketplace listings (`detail_product_marketplaces`).

use rust_decimal::Decimal;
use serde::Serialize;

use arvigo_core::{Channel, ListingId, ProductImages};

/// A listing row joined with its product, brand and merchant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub id: ListingId,
    pub name: String,
    pub brand: Option<String>,
    pub images: ProductImages,
    pub price: Decimal,
    pub merchant: Option<String>,
    pub link: Option<String>,
    /// `None` when the row has neither an address nor a marketplace.
    pub channel: Option<Channel>,
    pub is_subscription_active: bool,
}

/// A listing as shown on storefronts and product pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreListing {
    pub id: ListingId,
    pub name: String,
    pub brand: Option<String>,
    pub image: String,
    pub price: Decimal,
    pub merchant: Option<String>,
    /// `"offline"`, `"online"`, or empty for an unclassified row.
    pub store_type: String,
    pub address: Option<String>,
    pub marketplace_name: Option<String>,
    pub marketplace_link: Option<String>,
    #[serde(skip)]
    pub is_subscription_active: bool,
}
