//! Status and classification enums stored as text columns.

use serde::{Deserialize, Serialize};

/// Review status of a catalog product.
///
/// Merchant submissions start `Pending` and are moved to `Approved` or
/// `Rejected` by an admin; `Subscribed` marks a listing paid for by an
/// active merchant subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Approved,
    Pending,
    Rejected,
    Subscribed,
}

impl ProductStatus {
    /// Statuses that make a product visible on a merchant storefront.
    pub const VISIBLE: [Self; 2] = [Self::Approved, Self::Subscribed];

    /// Column value for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Subscribed => "subscribed",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "pending" => Ok(Self::Pending),
            "rejected" => Ok(Self::Rejected),
            "subscribed" => Ok(Self::Subscribed),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

/// Account roles known to the API.
///
/// The numeric id of each role lives in [`crate::CatalogTables::roles`];
/// this enum only names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Back-office staff.
    Admin,
    /// Merchant account that owns products.
    Partner,
    /// Shopper using the mobile app.
    Mobile,
}

impl Role {
    /// Role name as used in login payloads and the lookup table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Partner => "partner",
            Self::Mobile => "mobile",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_status_round_trips_through_column_text() {
        for status in [
            ProductStatus::Approved,
            ProductStatus::Pending,
            ProductStatus::Rejected,
            ProductStatus::Subscribed,
        ] {
            assert_eq!(status.as_str().parse::<ProductStatus>(), Ok(status));
        }
        assert!("archived".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn visible_statuses() {
        assert!(ProductStatus::VISIBLE.contains(&ProductStatus::Approved));
        assert!(ProductStatus::VISIBLE.contains(&ProductStatus::Subscribed));
        assert!(!ProductStatus::VISIBLE.contains(&ProductStatus::Pending));
    }
}
