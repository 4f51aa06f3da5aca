//! Quota entities for per-client rate limiting.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub admitted: bool,
    /// Requests left in the current window after this one.
    pub remaining: i64,
    /// Time until the window resets.
    pub reset_in: Duration,
}

impl RateLimitDecision {
    pub fn admitted(remaining: i64, reset_in: Duration) -> Self {
        Self {
            admitted: true,
            remaining,
            reset_in,
        }
    }

    pub fn rejected(reset_in: Duration) -> Self {
        Self {
            admitted: false,
            remaining: 0,
            reset_in,
        }
    }
}

/// Stored quota state of one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRecord {
    pub client_key: String,
    pub remaining: i64,
    pub window_expires_at: Option<DateTime<Utc>>,
}

impl QuotaRecord {
    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0
    }
}
