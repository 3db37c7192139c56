//! Merchant storefronts and the merchant dashboard.

use tracing::instrument;

use arvigo_core::{AddressId, CatalogTables, MerchantId, UserId};

use super::ServiceError;
use super::listings::store_listings;
use crate::db::{AddressLookup, CatalogStore, MerchantStore, UserStore};
use crate::models::{DashboardProduct, MerchantStorefront};

/// Merchant service.
pub struct MerchantService<'a> {
    users: &'a dyn UserStore,
    merchants: &'a dyn MerchantStore,
    catalog: &'a dyn CatalogStore,
    addresses: &'a dyn AddressLookup,
    tables: &'a CatalogTables,
}

impl<'a> MerchantService<'a> {
    #[must_use]
    pub const fn new(
        users: &'a dyn UserStore,
        merchants: &'a dyn MerchantStore,
        catalog: &'a dyn CatalogStore,
        addresses: &'a dyn AddressLookup,
        tables: &'a CatalogTables,
    ) -> Self {
        Self {
            users,
            merchants,
            catalog,
            addresses,
            tables,
        }
    }

    /// Every merchant with its location and visible listings.
    ///
    /// Listings of subscribed products come first; otherwise database order
    /// is kept.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if an owner or listing query fails.
    /// Address lookups never fail the call.
    #[instrument(skip(self))]
    pub async fn storefronts(&self) -> Result<Vec<MerchantStorefront>, ServiceError> {
        let owners = self.merchants.storefront_owners().await?;
        let mut storefronts = Vec::with_capacity(owners.len());

        for owner in owners {
            let location = match owner.address_id {
                Some(id) => self.location(id).await,
                None => String::new(),
            };

            let records = self.merchants.storefront_listings(owner.merchant_id).await?;
            let mut products = store_listings(self.addresses, self.tables, records).await;
            products.sort_by_key(|listing| !listing.is_subscription_active);

            storefronts.push(MerchantStorefront {
                merchant_id: owner.merchant_id,
                merchant_name: owner.merchant_name,
                location,
                products,
            });
        }

        Ok(storefronts)
    }

    /// The merchant owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user owns no merchant.
    pub async fn merchant_for(&self, user: UserId) -> Result<MerchantId, ServiceError> {
        self.users
            .merchant_of(user)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Merchant not found".to_owned()))
    }

    /// Products of the caller's merchant with every image and their listings.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user owns no merchant.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn dashboard(&self, user: UserId) -> Result<Vec<DashboardProduct>, ServiceError> {
        let merchant = self.merchant_for(user).await?;
        let records = self.merchants.dashboard_products(merchant).await?;

        let mut products = Vec::with_capacity(records.len());
        for record in records {
            let listings = self.catalog.product_listings(record.id).await?;
            let marketplaces = store_listings(self.addresses, self.tables, listings).await;

            products.push(DashboardProduct {
                id: record.id,
                name: record.name,
                images: record.images.all(),
                price: record.price,
                status: record.status,
                clicked: record.clicked,
                rejected_note: record.rejected_note,
                marketplaces,
            });
        }

        Ok(products)
    }

    async fn location(&self, id: AddressId) -> String {
        match self.addresses.address(id).await {
            Ok(Some(address)) => address.location(),
            Ok(None) => {
                tracing::warn!(address_id = %id, "Merchant address not found");
                String::new()
            }
            Err(e) => {
                tracing::warn!(address_id = %id, error = %e, "Merchant address lookup failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use arvigo_core::{Channel, ListingId, MarketplaceId, ProductId, ProductImages, ProductStatus};
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{DashboardRecord, ListingRecord, RecommendationProfile, StorefrontOwner};
    use crate::services::fakes::{FakeStore, address, user};

    fn listing(id: i64, subscribed: bool) -> ListingRecord {
        ListingRecord {
            id: ListingId::new(id),
            name: format!("Listing {id}"),
            brand: None,
            images: ProductImages::new(format!("l{id}.jpg,l{id}-2.jpg")),
            price: Decimal::new(99_000, 0),
            merchant: Some("Optik Jaya".to_owned()),
            link: None,
            channel: Channel::classify(None, Some(MarketplaceId::new(1))),
            is_subscription_active: subscribed,
        }
    }

    fn owner(merchant: i64, address: Option<i64>) -> StorefrontOwner {
        StorefrontOwner {
            merchant_id: MerchantId::new(merchant),
            merchant_name: format!("Merchant {merchant}"),
            address_id: address.map(AddressId::new),
        }
    }

    #[tokio::test]
    async fn subscribed_listings_come_first_in_stable_order() {
        let store = FakeStore::default();
        store.add_address(3, address("Jl. Dago 10", "Bandung"));
        store.add_storefront(owner(1, Some(3)), vec![
            listing(1, false),
            listing(2, true),
            listing(3, false),
            listing(4, true),
        ]);
        let tables = CatalogTables::default();
        let service = MerchantService::new(&store, &store, &store, &store, &tables);

        let storefronts = service.storefronts().await.unwrap();

        assert_eq!(storefronts.len(), 1);
        assert_eq!(storefronts[0].location, "Bandung, Jawa Barat");
        let order: Vec<i64> = storefronts[0].products.iter().map(|l| l.id.as_i64()).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
        assert_eq!(storefronts[0].products[0].image, "l2.jpg");
        assert_eq!(
            storefronts[0].products[0].marketplace_name.as_deref(),
            Some("Tokopedia")
        );
    }

    #[tokio::test]
    async fn address_failure_leaves_location_empty() {
        let store = FakeStore::default();
        store.add_storefront(owner(1, Some(3)), vec![listing(1, false)]);
        store.add_storefront(owner(2, None), vec![]);
        store.fail_address_lookups();
        let tables = CatalogTables::default();
        let service = MerchantService::new(&store, &store, &store, &store, &tables);

        let storefronts = service.storefronts().await.unwrap();

        assert_eq!(storefronts.len(), 2);
        assert_eq!(storefronts[0].location, "");
        assert_eq!(storefronts[0].products.len(), 1);
        assert_eq!(storefronts[1].location, "");
    }

    #[tokio::test]
    async fn dashboard_requires_a_merchant() {
        let store = FakeStore::default();
        store.add_user(user(1, RecommendationProfile::default()));
        let tables = CatalogTables::default();
        let service = MerchantService::new(&store, &store, &store, &store, &tables);

        let err = service.dashboard(UserId::new(1)).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn dashboard_lists_every_image() {
        let store = FakeStore::default();
        let mut partner = user(1, RecommendationProfile::default());
        partner.merchant_id = Some(MerchantId::new(8));
        store.add_user(partner);
        store.add_dashboard(8, vec![DashboardRecord {
            id: ProductId::new(20),
            name: "Cat eye".to_owned(),
            images: ProductImages::new("a.jpg,b.jpg,c.jpg".to_owned()),
            price: Decimal::new(120_000, 0),
            status: ProductStatus::Rejected,
            clicked: 14,
            rejected_note: "Blurry photo".to_owned(),
        }]);
        store.add_listings(20, vec![listing(5, false)]);
        let tables = CatalogTables::default();
        let service = MerchantService::new(&store, &store, &store, &store, &tables);

        let products = service.dashboard(UserId::new(1)).await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].images, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(products[0].clicked, 14);
        assert_eq!(products[0].marketplaces.len(), 1);
    }
}
