//! Domain models for the API.
//!
//! Records returned by repositories sit next to the response shapes the
//! services assemble from them. Response shapes derive `Serialize` and keep
//! the field names the mobile client and dashboard already consume.

pub mod address;
pub mod listing;
pub mod merchant;
pub mod product;
pub mod subscription;
pub mod user;

pub use address::Address;
pub use listing::{ListingRecord, StoreListing};
pub use merchant::{DashboardProduct, DashboardRecord, MerchantStorefront, StorefrontOwner};
pub use product::{
    ExportRecord, MarketplaceProduct, MerchantProductEdit, NewProduct, ProductCard, ProductDetail,
    ProductExport, ProductFilter, ProductRecord, ProductReview, ProductSummary, ProductUpdate,
};
pub use subscription::Subscription;
pub use user::{
    AuthToken, LoginRecord, NewUser, ProfileRecord, RecommendationProfile, UserProfile, UserUpdate,
};
