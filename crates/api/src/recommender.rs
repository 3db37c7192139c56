//! Client for the machine-learning recommendation service.
//!
//! The service ranks products for a free-text query:
//! `GET {ML_API_URL}/product_search?query=<text>` returns a JSON array of
//! objects carrying at least an `id` (sent as a string or a number).

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use arvigo_core::ProductId;

use crate::config::RecommenderConfig;

/// Errors that can occur when calling the recommendation service.
#[derive(Debug, Error)]
pub enum RecommenderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Ranked product search.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// Product ids matching `query`, best match first.
    async fn search(&self, query: &str) -> Result<Vec<ProductId>, RecommenderError>;
}

/// One result of `/product_search`. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct SearchHit {
    id: RawId,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn product_id(&self) -> Result<ProductId, RecommenderError> {
        match self {
            Self::Number(id) => Ok(ProductId::new(*id)),
            Self::Text(text) => text
                .trim()
                .parse::<i64>()
                .map(ProductId::new)
                .map_err(|_| RecommenderError::Parse(format!("invalid product id: {text:?}"))),
        }
    }
}

/// Parse a `/product_search` body into ranked product ids.
fn parse_hits(body: &[u8]) -> Result<Vec<ProductId>, RecommenderError> {
    let hits: Vec<SearchHit> =
        serde_json::from_slice(body).map_err(|e| RecommenderError::Parse(e.to_string()))?;
    hits.iter().map(|hit| hit.id.product_id()).collect()
}

/// HTTP client for the recommendation service.
#[derive(Clone)]
pub struct RecommenderClient {
    client: reqwest::Client,
    search_url: Url,
}

impl RecommenderClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the search URL cannot be derived from the base URL or
    /// the HTTP client fails to build.
    pub fn new(config: &RecommenderConfig) -> Result<Self, RecommenderError> {
        let mut base = config.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let search_url = base
            .join("product_search")
            .map_err(|e| RecommenderError::Parse(format!("invalid ML_API_URL: {e}")))?;

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, search_url })
    }
}

#[async_trait]
impl ProductSearch for RecommenderClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<ProductId>, RecommenderError> {
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("query", query)])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RecommenderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let ids = parse_hits(&body)?;
        tracing::debug!(hits = ids.len(), "Recommendation service answered");
        Ok(ids)
    }
}
