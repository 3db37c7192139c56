//! Postal addresses of users and offline stores.

use serde::Serialize;

/// A stored address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub street: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub sub_district: String,
    pub postal_code: String,
}

impl Address {
    /// Short location label, e.g. `"Bandung, Jawa Barat"`.
    #[must_use]
    pub fn location(&self) -> String {
        join_non_empty(&[&self.city, &self.province])
    }

    /// Single-line address for a store listing.
    #[must_use]
    pub fn formatted(&self) -> String {
        let line = join_non_empty(&[
            &self.street,
            &self.sub_district,
            &self.district,
            &self.city,
            &self.province,
        ]);
        if self.postal_code.is_empty() {
            line
        } else {
            format!("{line} {}", self.postal_code)
        }
    }
}

fn join_non_empty(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
