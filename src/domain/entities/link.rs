//! Link entity representing a short identifier mapped to a target URL.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A live short link.
///
/// The store owns the record; this is a snapshot taken while handling a
/// single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: String,
    pub target_url: String,
    pub expires_at: DateTime<Utc>,
}

impl LinkRecord {
    /// Creates a record that expires `ttl` from now.
    pub fn expiring_in(id: String, target_url: String, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            id,
            target_url,
            expires_at,
        }
    }

    /// Returns true if the record has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
