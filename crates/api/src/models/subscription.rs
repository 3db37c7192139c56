//! Paid subscriptions of users and merchants.

use chrono::{DateTime, Utc};

/// A subscription period from `detail_user_subscriptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_verified: bool,
}

impl Subscription {
    /// Whether the subscription is verified and `now` lies inside its period.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.is_verified && self.start <= now && now <= self.end
    }
}
