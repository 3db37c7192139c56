//! Home feed: face shape, personality and general recommendations.

use serde::Serialize;
use tracing::instrument;

use arvigo_core::{CatalogTables, CategoryId, TagId, UserId};

use super::ServiceError;
use super::catalog::product_cards;
use crate::db::{CatalogStore, RepositoryError, UserStore};
use crate::models::{ProductCard, ProductFilter};

/// The three product lists of the home screen.
#[derive(Debug, Clone, Serialize)]
pub struct HomeFeed {
    pub personalities: Vec<ProductCard>,
    pub face_shapes: Vec<ProductCard>,
    pub recommendations: Vec<ProductCard>,
}

/// Home feed service.
pub struct HomeService<'a> {
    users: &'a dyn UserStore,
    catalog: &'a dyn CatalogStore,
    tables: &'a CatalogTables,
}

impl<'a> HomeService<'a> {
    #[must_use]
    pub const fn new(
        users: &'a dyn UserStore,
        catalog: &'a dyn CatalogStore,
        tables: &'a CatalogTables,
    ) -> Self {
        Self {
            users,
            catalog,
            tables,
        }
    }

    /// Build the home feed of a user.
    ///
    /// A branch whose completion flag is unset stays empty and issues no
    /// query. Any query failure fails the whole feed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown user and
    /// `ServiceError::Repository` if a query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn home(&self, user_id: UserId) -> Result<HomeFeed, ServiceError> {
        let profile = self
            .users
            .recommendation_profile(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_owned()))?;

        let face_shapes = match profile.face_shape {
            Some(shape) if profile.is_complete_face_test => {
                let tags = self.tables.face_shape_tags(shape);
                self.tagged(self.tables.glasses_category_id, tags).await?
            }
            _ => Vec::new(),
        };

        let personalities = if profile.is_complete_personality_test {
            self.tagged(self.tables.makeup_category_id, &profile.personality_tags)
                .await?
        } else {
            Vec::new()
        };

        let recommended = self.catalog.platform_products(ProductFilter::default()).await?;
        let recommendations = product_cards(self.catalog, self.tables, recommended).await?;

        tracing::debug!(
            face_shapes = face_shapes.len(),
            personalities = personalities.len(),
            recommendations = recommendations.len(),
            "Home feed built"
        );

        Ok(HomeFeed {
            personalities,
            face_shapes,
            recommendations,
        })
    }

    /// Platform products of a category carrying any of the tags.
    async fn tagged(
        &self,
        category: CategoryId,
        tags: &[TagId],
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let products = self
            .catalog
            .platform_products(ProductFilter {
                category: Some(category),
                tags: Some(tags),
            })
            .await?;

        product_cards(self.catalog, self.tables, products).await
    }
}
