//! In-memory implementations of the repository ports for service tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use rust_decimal::Decimal;

use arvigo_core::{
    AddressId, CategoryId, Email, MerchantId, ProductId, ProductImages, ProductStatus, RoleId,
    TagId, UserId,
};

use crate::db::{AddressLookup, CatalogStore, MerchantStore, RepositoryError, UserStore};
use crate::models::{
    Address, DashboardRecord, ExportRecord, ListingRecord, LoginRecord, MerchantProductEdit,
    NewProduct, NewUser, ProductFilter, ProductRecord, ProductReview, ProductSummary,
    ProductUpdate, ProfileRecord, RecommendationProfile, StorefrontOwner, UserUpdate,
};

/// A stored user.
#[derive(Debug, Clone)]
pub struct FakeUser {
    pub id: UserId,
    pub email: Email,
    pub role_id: RoleId,
    pub full_name: String,
    pub password_hash: String,
    pub merchant_id: Option<MerchantId>,
    pub recommendation: RecommendationProfile,
    pub profile: Option<ProfileRecord>,
    pub update: Option<UserUpdate>,
}

/// A stored product.
#[derive(Debug, Clone)]
pub struct FakeProduct {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub brand: Option<String>,
    pub images: String,
    pub category: CategoryId,
    pub merchant: Option<MerchantId>,
    pub tags: Vec<TagId>,
    pub status: ProductStatus,
    pub rejected_note: Option<String>,
    pub clicked: i64,
}

#[derive(Default)]
struct State {
    users: Vec<FakeUser>,
    products: Vec<FakeProduct>,
    created_products: Vec<NewProduct>,
    listings: HashMap<ProductId, Vec<ListingRecord>>,
    owners: Vec<StorefrontOwner>,
    merchant_listings: HashMap<MerchantId, Vec<ListingRecord>>,
    dashboards: HashMap<MerchantId, Vec<DashboardRecord>>,
    addresses: HashMap<AddressId, Address>,
    fail_addresses: bool,
    fail_product_writes: bool,
    filters: Vec<(Option<CategoryId>, Option<Vec<TagId>>)>,
    next_id: i64,
}

/// Every port backed by one in-memory state.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<State>,
}

/// An address in a city, other fields filled with fixed values.
pub fn address(street: &str, city: &str) -> Address {
    Address {
        street: street.to_owned(),
        province: "Jawa Barat".to_owned(),
        city: city.to_owned(),
        district: "Coblong".to_owned(),
        sub_district: "Dago".to_owned(),
        postal_code: "40135".to_owned(),
    }
}

/// A platform product in a category with tags.
pub fn product(id: i64, category: i64, tags: &[i64]) -> FakeProduct {
    FakeProduct {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: "Description".to_owned(),
        price: Decimal::new(250_000, 0),
        brand: Some("Brand".to_owned()),
        images: format!("p{id}-a.jpg,p{id}-b.jpg"),
        category: CategoryId::new(category),
        merchant: None,
        tags: tags.iter().copied().map(TagId::new).collect(),
        status: ProductStatus::Approved,
        rejected_note: None,
        clicked: 0,
    }
}

/// A pending product of a merchant.
pub fn merchant_product(id: i64, merchant: i64) -> FakeProduct {
    FakeProduct {
        merchant: Some(MerchantId::new(merchant)),
        status: ProductStatus::Pending,
        ..product(id, 1, &[])
    }
}

/// A user with the given recommendation profile.
pub fn user(id: i64, recommendation: RecommendationProfile) -> FakeUser {
    FakeUser {
        id: UserId::new(id),
        email: Email::parse(&format!("user{id}@arvigo.id")).unwrap(),
        role_id: RoleId::new(3),
        full_name: format!("User {id}"),
        password_hash: String::new(),
        merchant_id: None,
        recommendation,
        profile: None,
        update: None,
    }
}

impl FakeStore {
    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn add_user(&self, user: FakeUser) {
        self.with(|s| s.users.push(user));
    }

    pub fn add_product(&self, product: FakeProduct) {
        self.with(|s| s.products.push(product));
    }

    pub fn add_address(&self, id: i64, address: Address) {
        self.with(|s| s.addresses.insert(AddressId::new(id), address));
    }

    pub fn add_listings(&self, product: i64, listings: Vec<ListingRecord>) {
        self.with(|s| s.listings.insert(ProductId::new(product), listings));
    }

    pub fn add_storefront(&self, owner: StorefrontOwner, listings: Vec<ListingRecord>) {
        self.with(|s| {
            s.merchant_listings.insert(owner.merchant_id, listings);
            s.owners.push(owner);
        });
    }

    pub fn add_dashboard(&self, merchant: i64, products: Vec<DashboardRecord>) {
        self.with(|s| s.dashboards.insert(MerchantId::new(merchant), products));
    }

    pub fn fail_address_lookups(&self) {
        self.with(|s| s.fail_addresses = true);
    }

    /// Make product inserts and updates fail like a lost connection.
    pub fn fail_product_writes(&self) {
        self.with(|s| s.fail_product_writes = true);
    }

    pub fn stored_product(&self, id: i64) -> Option<FakeProduct> {
        self.with(|s| s.products.iter().find(|p| p.id == ProductId::new(id)).cloned())
    }

    /// Filters passed to `platform_products`, in call order.
    pub fn product_queries(&self) -> Vec<(Option<CategoryId>, Option<Vec<TagId>>)> {
        self.with(|s| s.filters.clone())
    }

    pub fn users(&self) -> Vec<FakeUser> {
        self.with(|s| s.users.clone())
    }

    pub fn created_products(&self) -> Vec<NewProduct> {
        self.with(|s| s.created_products.clone())
    }

    pub fn has_product(&self, id: i64) -> bool {
        self.with(|s| s.products.iter().any(|p| p.id == ProductId::new(id)))
    }

    fn next_id(&self) -> i64 {
        self.with(|s| {
            s.next_id += 1;
            s.next_id + 100
        })
    }
}

fn summary(product: &FakeProduct) -> ProductSummary {
    ProductSummary {
        id: product.id,
        name: product.name.clone(),
        brand: product.brand.clone(),
        images: ProductImages::new(product.images.clone()),
    }
}

#[async_trait]
impl UserStore for FakeStore {
    async fn find_for_login(
        &self,
        email: &Email,
        role_id: RoleId,
    ) -> Result<Option<LoginRecord>, RepositoryError> {
        Ok(self.with(|s| {
            s.users
                .iter()
                .find(|u| &u.email == email && u.role_id == role_id)
                .map(|u| LoginRecord {
                    id: u.id,
                    role_id: u.role_id,
                    full_name: u.full_name.clone(),
                    password_hash: u.password_hash.clone(),
                })
        }))
    }

    async fn create(&self, user: &NewUser) -> Result<UserId, RepositoryError> {
        if self.with(|s| s.users.iter().any(|u| u.email == user.email)) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let id = UserId::new(self.next_id());
        let mut stored = self::user(id.as_i64(), RecommendationProfile::default());
        stored.email = user.email.clone();
        stored.role_id = user.role_id;
        stored.full_name.clone_from(&user.full_name);
        stored.password_hash.clone_from(&user.password_hash);
        self.add_user(stored);
        Ok(id)
    }

    async fn create_partner(
        &self,
        _merchant_name: &str,
        user: &NewUser,
    ) -> Result<(UserId, MerchantId), RepositoryError> {
        let id = self.create(user).await?;
        let merchant = MerchantId::new(self.next_id());
        self.with(|s| {
            if let Some(u) = s.users.iter_mut().find(|u| u.id == id) {
                u.merchant_id = Some(merchant);
            }
        });
        Ok((id, merchant))
    }

    async fn update(&self, id: UserId, update: &UserUpdate) -> Result<bool, RepositoryError> {
        Ok(self.with(|s| {
            s.users.iter_mut().find(|u| u.id == id).is_some_and(|u| {
                u.update = Some(update.clone());
                true
            })
        }))
    }

    async fn recommendation_profile(
        &self,
        id: UserId,
    ) -> Result<Option<RecommendationProfile>, RepositoryError> {
        Ok(self.with(|s| {
            s.users
                .iter()
                .find(|u| u.id == id)
                .map(|u| u.recommendation.clone())
        }))
    }

    async fn profile(&self, id: UserId) -> Result<Option<ProfileRecord>, RepositoryError> {
        Ok(self.with(|s| {
            s.users
                .iter()
                .find(|u| u.id == id)
                .and_then(|u| u.profile.clone())
        }))
    }

    async fn merchant_of(&self, id: UserId) -> Result<Option<MerchantId>, RepositoryError> {
        Ok(self.with(|s| s.users.iter().find(|u| u.id == id).and_then(|u| u.merchant_id)))
    }
}

#[async_trait]
impl CatalogStore for FakeStore {
    async fn platform_products(
        &self,
        filter: ProductFilter<'_>,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        Ok(self.with(|s| {
            s.filters
                .push((filter.category, filter.tags.map(<[TagId]>::to_vec)));
            s.products
                .iter()
                .filter(|p| p.merchant.is_none())
                .filter(|p| filter.category.is_none_or(|c| c == p.category))
                .filter(|p| filter.tags.is_none_or(|tags| p.tags.iter().any(|t| tags.contains(t))))
                .map(summary)
                .collect()
        }))
    }

    async fn product_tag_ids(&self, product: ProductId) -> Result<Vec<TagId>, RepositoryError> {
        Ok(self.with(|s| {
            s.products
                .iter()
                .find(|p| p.id == product)
                .map(|p| p.tags.clone())
                .unwrap_or_default()
        }))
    }

    async fn products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        // Storage order, not request order.
        Ok(self.with(|s| {
            s.products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .map(summary)
                .collect()
        }))
    }

    async fn product(&self, id: ProductId) -> Result<Option<ProductRecord>, RepositoryError> {
        Ok(self.with(|s| {
            s.products.iter().find(|p| p.id == id).map(|p| ProductRecord {
                id: p.id,
                name: p.name.clone(),
                description: p.description.clone(),
                price: p.price,
                brand_name: p.brand.clone(),
                category_name: Some("Glasses".to_owned()),
                merchant_id: p.merchant,
                images: ProductImages::new(p.images.clone()),
                status: p.status,
                is_subscription_active: false,
                rejected_note: p.rejected_note.clone().unwrap_or_default(),
                link_external: String::new(),
            })
        }))
    }

    async fn product_listings(
        &self,
        product: ProductId,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        Ok(self.with(|s| s.listings.get(&product).cloned().unwrap_or_default()))
    }

    async fn create_product(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        if self.with(|s| s.fail_product_writes) {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        let id = ProductId::new(self.next_id());
        self.with(|s| s.created_products.push(product.clone()));
        Ok(id)
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.with(|s| {
            let before = s.products.len();
            s.products.retain(|p| p.id != id);
            s.listings.remove(&id);
            s.products.len() < before
        }))
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<ProductImages>, RepositoryError> {
        self.with(|s| {
            if s.fail_product_writes {
                return Err(sqlx::Error::PoolTimedOut.into());
            }
            Ok(s.products.iter_mut().find(|p| p.id == id).map(|p| {
                p.name.clone_from(&update.name);
                p.description.clone_from(&update.description);
                p.price = update.price;
                p.category = update.category_id;
                p.tags.clone_from(&update.tags);
                let previous = std::mem::replace(&mut p.images, update.images.as_str().to_owned());
                ProductImages::new(previous)
            }))
        })
    }

    async fn update_merchant_product(
        &self,
        merchant: MerchantId,
        id: ProductId,
        edit: &MerchantProductEdit,
    ) -> Result<bool, RepositoryError> {
        Ok(self.with(|s| {
            s.products
                .iter_mut()
                .find(|p| p.id == id && p.merchant == Some(merchant))
                .is_some_and(|p| {
                    p.name.clone_from(&edit.name);
                    p.description.clone_from(&edit.description);
                    p.price = edit.price;
                    p.status = ProductStatus::Pending;
                    p.rejected_note = None;
                    true
                })
        }))
    }

    async fn review_product(
        &self,
        id: ProductId,
        review: &ProductReview,
    ) -> Result<bool, RepositoryError> {
        Ok(self.with(|s| {
            s.products
                .iter_mut()
                .find(|p| p.id == id && p.merchant.is_some())
                .is_some_and(|p| {
                    p.status = review.status;
                    p.rejected_note.clone_from(&review.rejected_note);
                    true
                })
        }))
    }

    async fn record_click(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.with(|s| {
            s.products.iter_mut().find(|p| p.id == id).is_some_and(|p| {
                p.clicked += 1;
                true
            })
        }))
    }

    async fn export_products(&self) -> Result<Vec<ExportRecord>, RepositoryError> {
        Ok(self.with(|s| {
            s.products
                .iter()
                .filter(|p| ProductStatus::VISIBLE.contains(&p.status))
                .map(|p| ExportRecord {
                    id: p.id,
                    name: p.name.clone(),
                    description: p.description.clone(),
                    category: Some("Glasses".to_owned()),
                    brand: p.brand.clone(),
                    merchant: p.merchant.map(|m| format!("Merchant {m}")),
                    clicked: p.clicked,
                })
                .collect()
        }))
    }
}

#[async_trait]
impl MerchantStore for FakeStore {
    async fn storefront_owners(&self) -> Result<Vec<StorefrontOwner>, RepositoryError> {
        Ok(self.with(|s| s.owners.clone()))
    }

    async fn storefront_listings(
        &self,
        merchant: MerchantId,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        Ok(self.with(|s| s.merchant_listings.get(&merchant).cloned().unwrap_or_default()))
    }

    async fn dashboard_products(
        &self,
        merchant: MerchantId,
    ) -> Result<Vec<DashboardRecord>, RepositoryError> {
        Ok(self.with(|s| s.dashboards.get(&merchant).cloned().unwrap_or_default()))
    }
}

#[async_trait]
impl AddressLookup for FakeStore {
    async fn address(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        self.with(|s| {
            if s.fail_addresses {
                Err(RepositoryError::DataCorruption("address lookup failed".to_owned()))
            } else {
                Ok(s.addresses.get(&id).cloned())
            }
        })
    }
}
