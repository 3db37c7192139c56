//! The product `images` column.
//!
//! Products store every image URL in a single comma-delimited text column.
//! Single-image responses show element 0 of the split; multi-image responses
//! show every element, in order, exactly as stored.

use serde::{Deserialize, Serialize};

const SEPARATOR: char = ',';

/// Raw value of a product's `images` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductImages(String);

impl ProductImages {
    /// Wrap a raw column value.
    #[must_use]
    pub const fn new(raw: String) -> Self {
        Self(raw)
    }

    /// Build the column value from individual image URLs.
    #[must_use]
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = urls
            .into_iter()
            .map(|url| url.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(",");
        Self(joined)
    }

    /// The display image: everything before the first comma.
    #[must_use]
    pub fn primary(&self) -> &str {
        self.0.split(SEPARATOR).next().unwrap_or_default()
    }

    /// Every image in storage order. An empty column has no images.
    #[must_use]
    pub fn all(&self) -> Vec<String> {
        if self.0.is_empty() {
            return Vec::new();
        }
        self.0.split(SEPARATOR).map(str::to_owned).collect()
    }

    /// The raw column value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ProductImages {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
