//! Turning listing rows into storefront listings.

use arvigo_core::{AddressId, CatalogTables, Channel};

use crate::db::AddressLookup;
use crate::models::{ListingRecord, StoreListing};

/// Resolve the channel of each listing.
///
/// Offline listings get their formatted address and online listings their
/// marketplace name. Address lookups are best effort: a failed or missing
/// lookup leaves `address` empty.
pub(crate) async fn store_listings(
    addresses: &dyn AddressLookup,
    tables: &CatalogTables,
    records: Vec<ListingRecord>,
) -> Vec<StoreListing> {
    let mut listings = Vec::with_capacity(records.len());

    for record in records {
        let (address, marketplace_name) = match record.channel {
            Some(Channel::Offline { address_id }) => {
                (formatted_address(addresses, address_id).await, None)
            }
            Some(Channel::Online { marketplace_id }) => {
                let name = tables.marketplace_name(marketplace_id);
                if name.is_none() {
                    tracing::warn!(marketplace_id = %marketplace_id, "Unknown marketplace");
                }
                (None, name.map(str::to_owned))
            }
            None => (None, None),
        };

        listings.push(StoreListing {
            id: record.id,
            image: record.images.primary().to_owned(),
            name: record.name,
            brand: record.brand,
            price: record.price,
            merchant: record.merchant,
            store_type: record
                .channel
                .map(Channel::store_type)
                .unwrap_or_default()
                .to_owned(),
            address,
            marketplace_name,
            marketplace_link: record.link,
            is_subscription_active: record.is_subscription_active,
        });
    }

    listings
}

async fn formatted_address(addresses: &dyn AddressLookup, id: AddressId) -> Option<String> {
    match addresses.address(id).await {
        Ok(Some(address)) => Some(address.formatted()),
        Ok(None) => {
            tracing::warn!(address_id = %id, "Listing address not found");
            None
        }
        Err(e) => {
            tracing::warn!(address_id = %id, error = %e, "Listing address lookup failed");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use arvigo_core::{ListingId, MarketplaceId, ProductImages};
    use rust_decimal::Decimal;

    use super::*;
    use crate::services::fakes::{FakeStore, address};

    fn record(id: i64, address: Option<i64>, marketplace: Option<i64>) -> ListingRecord {
        ListingRecord {
            id: ListingId::new(id),
            name: "Aviator".to_owned(),
            brand: Some("Rayban".to_owned()),
            images: ProductImages::new("a.jpg,b.jpg".to_owned()),
            price: Decimal::new(150_000, 0),
            merchant: Some("Optik Jaya".to_owned()),
            link: Some("https://tokopedia.com/x".to_owned()),
            channel: Channel::classify(
                address.map(AddressId::new),
                marketplace.map(MarketplaceId::new),
            ),
            is_subscription_active: false,
        }
    }

    #[tokio::test]
    async fn channels_are_resolved() {
        let store = FakeStore::default();
        store.add_address(5, address("Jl. Merdeka 1", "Bandung"));
        let tables = CatalogTables::default();

        let listings = store_listings(
            &store,
            &tables,
            vec![record(1, Some(5), None), record(2, None, Some(2)), record(3, None, None)],
        )
        .await;

        assert_eq!(listings[0].store_type, "offline");
        assert!(listings[0].address.as_deref().unwrap().starts_with("Jl. Merdeka 1"));
        assert_eq!(listings[0].marketplace_name, None);
        assert_eq!(listings[0].image, "a.jpg");

        assert_eq!(listings[1].store_type, "online");
        assert_eq!(listings[1].marketplace_name.as_deref(), Some("Shopee"));
        assert_eq!(listings[1].address, None);

        assert_eq!(listings[2].store_type, "");
        assert_eq!(listings[2].address, None);
        assert_eq!(listings[2].marketplace_name, None);
    }

    #[tokio::test]
    async fn failed_address_lookup_leaves_address_empty() {
        let store = FakeStore::default();
        store.fail_address_lookups();

        let listings =
            store_listings(&store, &CatalogTables::default(), vec![record(1, Some(5), None)]).await;

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].store_type, "offline");
        assert_eq!(listings[0].address, None);
    }
}
