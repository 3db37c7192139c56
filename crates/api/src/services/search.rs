//! Free-text product search backed by the recommendation service.

use std::collections::HashMap;

use tracing::instrument;

use arvigo_core::ProductId;

use super::ServiceError;
use crate::db::CatalogStore;
use crate::models::{ProductCard, ProductSummary};
use crate::recommender::ProductSearch;

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The recommendation service returned no ids.
    NoMatches,
    /// Matching products, best first.
    Found(Vec<ProductCard>),
}

/// Search service.
pub struct SearchService<'a> {
    search: &'a dyn ProductSearch,
    catalog: &'a dyn CatalogStore,
}

impl<'a> SearchService<'a> {
    #[must_use]
    pub const fn new(search: &'a dyn ProductSearch, catalog: &'a dyn CatalogStore) -> Self {
        Self { search, catalog }
    }

    /// Search products by free text.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::BadRequest` for a blank query,
    /// `ServiceError::Recommender` if the recommendation service fails and
    /// `ServiceError::Repository` if the product query fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::BadRequest("Search query is required".to_owned()));
        }

        let ranked = self.search.search(query).await?;
        if ranked.is_empty() {
            return Ok(SearchOutcome::NoMatches);
        }

        let products = self.catalog.products_by_ids(&ranked).await?;
        let cards = in_rank_order(&ranked, products)
            .into_iter()
            .map(|product| ProductCard::new(product, Vec::new()))
            .collect::<Vec<_>>();

        tracing::debug!(ranked = ranked.len(), found = cards.len(), "Search completed");
        Ok(SearchOutcome::Found(cards))
    }
}

/// Reorder products to follow `ranked`. Ids without a product are skipped,
/// repeated ids appear once.
fn in_rank_order(ranked: &[ProductId], products: Vec<ProductSummary>) -> Vec<ProductSummary> {
    let mut by_id: HashMap<ProductId, ProductSummary> =
        products.into_iter().map(|p| (p.id, p)).collect();
    ranked.iter().filter_map(|id| by_id.remove(id)).collect()
}
