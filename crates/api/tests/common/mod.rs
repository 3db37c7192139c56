//! Shared fixtures for router tests: in-memory repositories and a test state.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use url::Url;

use arvigo_api::config::{ApiConfig, JwtConfig, RecommenderConfig, UploadConfig};
use arvigo_api::db::{
    AddressLookup, CatalogStore, MerchantStore, RepositoryError, Repositories, UserStore,
};
use arvigo_api::models::{
    Address, DashboardRecord, ExportRecord, ListingRecord, LoginRecord, MerchantProductEdit,
    NewProduct, NewUser, ProductFilter, ProductRecord, ProductReview, ProductSummary,
    ProductUpdate, ProfileRecord, RecommendationProfile, StorefrontOwner, UserUpdate,
};
use arvigo_api::recommender::{ProductSearch, RecommenderError};
use arvigo_api::state::AppState;
use arvigo_api::uploads::{ImageStore, ImageStoreError};
use arvigo_core::{
    AddressId, CatalogTables, CategoryId, Email, MerchantId, ProductId, ProductImages,
    ProductStatus, RoleId, TagId, UserId,
};

pub const JWT_SECRET: &str = "q7R!zK2#vN9@xL4$wP8%tB1^mH6&cF3*";
pub const ML_API_KEY: &str = "ml-export-key";

/// A user row as the fake stores it.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: UserId,
    pub email: Email,
    pub role_id: RoleId,
    pub full_name: String,
    pub password_hash: String,
    pub merchant_id: Option<MerchantId>,
    pub address_id: Option<AddressId>,
    pub recommendation: RecommendationProfile,
}

/// A product with its category, tags and review state.
#[derive(Debug, Clone)]
pub struct StoredProduct {
    pub id: ProductId,
    pub name: String,
    pub images: String,
    pub category: CategoryId,
    pub merchant: Option<MerchantId>,
    pub tags: Vec<TagId>,
    pub status: ProductStatus,
    pub rejected_note: Option<String>,
    pub clicked: i64,
}

#[derive(Default)]
struct Data {
    users: Vec<StoredUser>,
    products: Vec<StoredProduct>,
    created: Vec<NewProduct>,
    owners: Vec<StorefrontOwner>,
    listings: HashMap<MerchantId, Vec<ListingRecord>>,
    addresses: HashMap<AddressId, Address>,
    next_id: i64,
}

/// In-memory implementation of every repository port.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
}

impl MemoryStore {
    pub fn add_user(&self, user: StoredUser) {
        self.data.lock().unwrap().users.push(user);
    }

    pub fn add_product(&self, id: i64, category: i64, tags: &[i64]) {
        self.data.lock().unwrap().products.push(StoredProduct {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            images: format!("p{id}-front.jpg,p{id}-side.jpg"),
            category: CategoryId::new(category),
            merchant: None,
            tags: tags.iter().copied().map(TagId::new).collect(),
            status: ProductStatus::Approved,
            rejected_note: None,
            clicked: 0,
        });
    }

    /// A pending product of `merchant`.
    pub fn add_merchant_product(&self, id: i64, merchant: i64) {
        self.add_product(id, 1, &[]);
        let mut data = self.data.lock().unwrap();
        if let Some(p) = data.products.iter_mut().find(|p| p.id == ProductId::new(id)) {
            p.merchant = Some(MerchantId::new(merchant));
            p.status = ProductStatus::Pending;
        }
    }

    pub fn stored_product(&self, id: i64) -> Option<StoredProduct> {
        let data = self.data.lock().unwrap();
        data.products
            .iter()
            .find(|p| p.id == ProductId::new(id))
            .cloned()
    }

    pub fn add_storefront(&self, owner: StorefrontOwner, listings: Vec<ListingRecord>) {
        let mut data = self.data.lock().unwrap();
        data.listings.insert(owner.merchant_id, listings);
        data.owners.push(owner);
    }

    pub fn add_address(&self, id: i64, address: Address) {
        self.data
            .lock()
            .unwrap()
            .addresses
            .insert(AddressId::new(id), address);
    }

    pub fn user_count(&self) -> usize {
        self.data.lock().unwrap().users.len()
    }

    pub fn created_products(&self) -> Vec<NewProduct> {
        self.data.lock().unwrap().created.clone()
    }

    fn next_id(&self) -> i64 {
        let mut data = self.data.lock().unwrap();
        data.next_id += 1;
        data.next_id + 1000
    }
}

fn summary(product: &StoredProduct) -> ProductSummary {
    ProductSummary {
        id: product.id,
        name: product.name.clone(),
        brand: None,
        images: ProductImages::new(product.images.clone()),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_for_login(
        &self,
        email: &Email,
        role_id: RoleId,
    ) -> Result<Option<LoginRecord>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter()
            .find(|u| &u.email == email && u.role_id == role_id)
            .map(|u| LoginRecord {
                id: u.id,
                role_id: u.role_id,
                full_name: u.full_name.clone(),
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn create(&self, user: &NewUser) -> Result<UserId, RepositoryError> {
        if self
            .data
            .lock()
            .unwrap()
            .users
            .iter()
            .any(|u| u.email == user.email)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let id = UserId::new(self.next_id());
        self.add_user(StoredUser {
            id,
            email: user.email.clone(),
            role_id: user.role_id,
            full_name: user.full_name.clone(),
            password_hash: user.password_hash.clone(),
            merchant_id: None,
            address_id: None,
            recommendation: RecommendationProfile::default(),
        });
        Ok(id)
    }

    async fn create_partner(
        &self,
        _merchant_name: &str,
        user: &NewUser,
    ) -> Result<(UserId, MerchantId), RepositoryError> {
        let id = self.create(user).await?;
        let merchant = MerchantId::new(self.next_id());
        let mut data = self.data.lock().unwrap();
        if let Some(u) = data.users.iter_mut().find(|u| u.id == id) {
            u.merchant_id = Some(merchant);
        }
        Ok((id, merchant))
    }

    async fn update(&self, id: UserId, update: &UserUpdate) -> Result<bool, RepositoryError> {
        let mut data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .is_some_and(|u| {
                u.full_name.clone_from(&update.full_name);
                true
            }))
    }

    async fn recommendation_profile(
        &self,
        id: UserId,
    ) -> Result<Option<RecommendationProfile>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.recommendation.clone()))
    }

    async fn profile(&self, id: UserId) -> Result<Option<ProfileRecord>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data.users.iter().find(|u| u.id == id).map(|u| ProfileRecord {
            id: u.id,
            email: u.email.clone(),
            role_id: u.role_id,
            full_name: u.full_name.clone(),
            gender: String::new(),
            date_of_birth: None,
            place_of_birth: String::new(),
            is_complete_personality_test: u.recommendation.is_complete_personality_test,
            is_complete_face_test: u.recommendation.is_complete_face_test,
            face_shape: u.recommendation.face_shape,
            personality_type: None,
            is_verified: false,
            avatar: String::new(),
            address_id: u.address_id,
            merchant_id: u.merchant_id,
            subscriptions: Vec::new(),
        }))
    }

    async fn merchant_of(&self, id: UserId) -> Result<Option<MerchantId>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .users
            .iter()
            .find(|u| u.id == id)
            .and_then(|u| u.merchant_id))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn platform_products(
        &self,
        filter: ProductFilter<'_>,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .products
            .iter()
            .filter(|p| p.merchant.is_none())
            .filter(|p| filter.category.is_none_or(|c| c == p.category))
            .filter(|p| {
                filter
                    .tags
                    .is_none_or(|tags| p.tags.iter().any(|t| tags.contains(t)))
            })
            .map(summary)
            .collect())
    }

    async fn product_tag_ids(&self, product: ProductId) -> Result<Vec<TagId>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .products
            .iter()
            .find(|p| p.id == product)
            .map(|p| p.tags.clone())
            .unwrap_or_default())
    }

    async fn products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(summary)
            .collect())
    }

    async fn product(&self, id: ProductId) -> Result<Option<ProductRecord>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data.products.iter().find(|p| p.id == id).map(|p| ProductRecord {
            id: p.id,
            name: p.name.clone(),
            description: String::new(),
            price: rust_decimal::Decimal::new(100_000, 0),
            brand_name: None,
            category_name: None,
            merchant_id: p.merchant,
            images: ProductImages::new(p.images.clone()),
            status: p.status,
            is_subscription_active: false,
            rejected_note: p.rejected_note.clone().unwrap_or_default(),
            link_external: String::new(),
        }))
    }

    async fn product_listings(
        &self,
        _product: ProductId,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let id = ProductId::new(self.next_id());
        self.data.lock().unwrap().created.push(product.clone());
        Ok(id)
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut data = self.data.lock().unwrap();
        let before = data.products.len();
        data.products.retain(|p| p.id != id);
        Ok(data.products.len() < before)
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<ProductImages>, RepositoryError> {
        let mut data = self.data.lock().unwrap();
        Ok(data.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.name.clone_from(&update.name);
            p.category = update.category_id;
            p.tags.clone_from(&update.tags);
            let previous = std::mem::replace(&mut p.images, update.images.as_str().to_owned());
            ProductImages::new(previous)
        }))
    }

    async fn update_merchant_product(
        &self,
        merchant: MerchantId,
        id: ProductId,
        edit: &MerchantProductEdit,
    ) -> Result<bool, RepositoryError> {
        let mut data = self.data.lock().unwrap();
        Ok(data
            .products
            .iter_mut()
            .find(|p| p.id == id && p.merchant == Some(merchant))
            .is_some_and(|p| {
                p.name.clone_from(&edit.name);
                p.status = ProductStatus::Pending;
                p.rejected_note = None;
                true
            }))
    }

    async fn review_product(
        &self,
        id: ProductId,
        review: &ProductReview,
    ) -> Result<bool, RepositoryError> {
        let mut data = self.data.lock().unwrap();
        Ok(data
            .products
            .iter_mut()
            .find(|p| p.id == id && p.merchant.is_some())
            .is_some_and(|p| {
                p.status = review.status;
                p.rejected_note.clone_from(&review.rejected_note);
                true
            }))
    }

    async fn record_click(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut data = self.data.lock().unwrap();
        Ok(data.products.iter_mut().find(|p| p.id == id).is_some_and(|p| {
            p.clicked += 1;
            true
        }))
    }

    async fn export_products(&self) -> Result<Vec<ExportRecord>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .products
            .iter()
            .filter(|p| ProductStatus::VISIBLE.contains(&p.status))
            .map(|p| ExportRecord {
                id: p.id,
                name: p.name.clone(),
                description: String::new(),
                category: None,
                brand: None,
                merchant: None,
                clicked: p.clicked,
            })
            .collect())
    }
}

#[async_trait]
impl MerchantStore for MemoryStore {
    async fn storefront_owners(&self) -> Result<Vec<StorefrontOwner>, RepositoryError> {
        Ok(self.data.lock().unwrap().owners.clone())
    }

    async fn storefront_listings(
        &self,
        merchant: MerchantId,
    ) -> Result<Vec<ListingRecord>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data.listings.get(&merchant).cloned().unwrap_or_default())
    }

    async fn dashboard_products(
        &self,
        _merchant: MerchantId,
    ) -> Result<Vec<DashboardRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl AddressLookup for MemoryStore {
    async fn address(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        Ok(self.data.lock().unwrap().addresses.get(&id).cloned())
    }
}

/// Recommendation service answering every query with fixed ids.
pub struct FixedSearch(pub Vec<i64>);

#[async_trait]
impl ProductSearch for FixedSearch {
    async fn search(&self, _query: &str) -> Result<Vec<ProductId>, RecommenderError> {
        Ok(self.0.iter().copied().map(ProductId::new).collect())
    }
}

/// Image store that keeps nothing and returns predictable URLs.
#[derive(Default)]
pub struct NullImages;

#[async_trait]
impl ImageStore for NullImages {
    async fn save(&self, original_name: &str, _bytes: &[u8]) -> Result<String, ImageStoreError> {
        Ok(format!("/uploads/{original_name}"))
    }

    async fn delete(&self, _url: &str) -> Result<bool, ImageStoreError> {
        Ok(false)
    }
}

pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://localhost/arvigo_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        jwt: JwtConfig {
            secret: SecretString::from(JWT_SECRET),
            expiry: Duration::from_secs(3600),
        },
        recommender: RecommenderConfig {
            base_url: Url::parse("http://localhost:5000").unwrap(),
            timeout: Duration::from_secs(1),
        },
        uploads: UploadConfig {
            dir: PathBuf::from("uploads"),
            public_url: "/uploads".to_owned(),
            max_body_bytes: 20 * 1024 * 1024,
        },
        ml_api_key: Some(SecretString::from(ML_API_KEY)),
        catalog_tables_path: None,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Router over `store` and a search service returning `ranked`.
pub fn test_app(store: Arc<MemoryStore>, ranked: Vec<i64>) -> (Router, AppState) {
    test_app_with(test_config(), store, ranked)
}

/// [`test_app`] with a custom configuration.
pub fn test_app_with(
    config: ApiConfig,
    store: Arc<MemoryStore>,
    ranked: Vec<i64>,
) -> (Router, AppState) {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/arvigo_test")
        .unwrap();
    let repositories = Repositories {
        users: store.clone(),
        catalog: store.clone(),
        merchants: store.clone(),
        addresses: store,
    };
    let state = AppState::from_parts(
        config,
        pool,
        repositories,
        Arc::new(FixedSearch(ranked)),
        Arc::new(NullImages),
        CatalogTables::default(),
    );
    (arvigo_api::app(state.clone()), state)
}

/// A bearer token for a user.
pub fn bearer(state: &AppState, id: i64, role_id: i64) -> String {
    let token = state
        .tokens()
        .issue(UserId::new(id), RoleId::new(role_id), "Tester")
        .unwrap();
    format!("Bearer {token}")
}

/// Send a request and decode the JSON body.
pub async fn send(app: Router, request: Request<Body>) -> (Response<()>, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (Response::from_parts(parts, ()), json)
}

/// A shopper with the given recommendation profile.
pub fn shopper(id: i64, recommendation: RecommendationProfile) -> StoredUser {
    StoredUser {
        id: UserId::new(id),
        email: Email::parse(&format!("shopper{id}@arvigo.id")).unwrap(),
        role_id: RoleId::new(3),
        full_name: format!("Shopper {id}"),
        password_hash: String::new(),
        merchant_id: None,
        address_id: None,
        recommendation,
    }
}
