//! Sales channel of a product listing.

use serde::{Deserialize, Serialize};

use crate::{AddressId, MarketplaceId};

/// Where a listing is sold: a physical address or an online marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "store_type", rename_all = "snake_case")]
pub enum Channel {
    Offline { address_id: AddressId },
    Online { marketplace_id: MarketplaceId },
}

impl Channel {
    /// Classify a listing row.
    ///
    /// An address wins over a marketplace; a row with neither has no channel.
    #[must_use]
    pub const fn classify(
        address_id: Option<AddressId>,
        marketplace_id: Option<MarketplaceId>,
    ) -> Option<Self> {
        match (address_id, marketplace_id) {
            (Some(address_id), _) => Some(Self::Offline { address_id }),
            (None, Some(marketplace_id)) => Some(Self::Online { marketplace_id }),
            (None, None) => None,
        }
    }

    /// Value of the `store_type` response field.
    #[must_use]
    pub const fn store_type(self) -> &'static str {
        match self {
            Self::Offline { .. } => "offline",
            Self::Online { .. } => "online",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_only_is_offline() {
        let channel = Channel::classify(Some(AddressId::new(5)), None);
        assert_eq!(
            channel,
            Some(Channel::Offline {
                address_id: AddressId::new(5)
            })
        );
        assert_eq!(channel.map(Channel::store_type), Some("offline"));
    }

    #[test]
    fn marketplace_only_is_online() {
        let channel = Channel::classify(None, Some(MarketplaceId::new(7)));
        assert_eq!(channel.map(Channel::store_type), Some("online"));
    }

    #[test]
    fn neither_has_no_channel() {
        assert_eq!(Channel::classify(None, None), None);
    }

    #[test]
    fn address_takes_precedence() {
        let channel = Channel::classify(Some(AddressId::new(1)), Some(MarketplaceId::new(2)));
        assert!(matches!(channel, Some(Channel::Offline { .. })));
    }
}
