//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use arvigo_core::CatalogTables;

use crate::config::ApiConfig;
use crate::db::{AddressLookup, CatalogStore, MerchantStore, Repositories, UserStore};
use crate::recommender::{ProductSearch, RecommenderClient, RecommenderError};
use crate::services::auth::TokenKeys;
use crate::services::{
    AuthService, CatalogService, HomeService, MerchantService, SearchService, UserService,
};
use crate::uploads::{ImageStore, LocalImageStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`; everything behind it is
/// read-only after start-up.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    repositories: Repositories,
    search: Arc<dyn ProductSearch>,
    images: Arc<dyn ImageStore>,
    tables: CatalogTables,
    tokens: TokenKeys,
}

impl AppState {
    /// Create the production state: `PostgreSQL` repositories, the HTTP
    /// recommendation client and local image storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the recommendation client cannot be built.
    pub fn new(
        config: ApiConfig,
        pool: PgPool,
        tables: CatalogTables,
    ) -> Result<Self, RecommenderError> {
        let repositories = Repositories::postgres(&pool);
        let search = Arc::new(RecommenderClient::new(&config.recommender)?);
        let images = Arc::new(LocalImageStore::new(&config.uploads));

        Ok(Self::from_parts(
            config,
            pool,
            repositories,
            search,
            images,
            tables,
        ))
    }

    /// Assemble state from explicit collaborators.
    #[must_use]
    pub fn from_parts(
        config: ApiConfig,
        pool: PgPool,
        repositories: Repositories,
        search: Arc<dyn ProductSearch>,
        images: Arc<dyn ImageStore>,
        tables: CatalogTables,
    ) -> Self {
        let tokens = TokenKeys::new(&config.jwt);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                repositories,
                search,
                images,
                tables,
                tokens,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the catalog lookup tables.
    #[must_use]
    pub fn tables(&self) -> &CatalogTables {
        &self.inner.tables
    }

    /// Get a reference to the token signing keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    fn users(&self) -> &dyn UserStore {
        self.inner.repositories.users.as_ref()
    }

    fn catalog_store(&self) -> &dyn CatalogStore {
        self.inner.repositories.catalog.as_ref()
    }

    fn merchant_store(&self) -> &dyn MerchantStore {
        self.inner.repositories.merchants.as_ref()
    }

    fn addresses(&self) -> &dyn AddressLookup {
        self.inner.repositories.addresses.as_ref()
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.users(), self.tables(), self.tokens())
    }

    #[must_use]
    pub fn home(&self) -> HomeService<'_> {
        HomeService::new(self.users(), self.catalog_store(), self.tables())
    }

    #[must_use]
    pub fn search(&self) -> SearchService<'_> {
        SearchService::new(self.inner.search.as_ref(), self.catalog_store())
    }

    #[must_use]
    pub fn merchants(&self) -> MerchantService<'_> {
        MerchantService::new(
            self.users(),
            self.merchant_store(),
            self.catalog_store(),
            self.addresses(),
            self.tables(),
        )
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(
            self.catalog_store(),
            self.addresses(),
            self.inner.images.as_ref(),
            self.tables(),
        )
    }

    #[must_use]
    pub fn profiles(&self) -> UserService<'_> {
        UserService::new(self.users(), self.addresses(), self.tables())
    }
}
