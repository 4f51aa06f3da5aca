//! DTOs for the link shortening endpoint.

use serde::{Deserialize, Serialize};

use crate::application::services::{ShortenCommand, ShortenOutcome};
use crate::utils::duration::whole_minutes;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    /// Target URL. `http://` is assumed when no scheme is given.
    pub url: String,

    /// Optional custom identifier. Empty means "generate one".
    #[serde(default)]
    pub short: Option<String>,

    /// Optional lifetime in hours. Zero or absent selects the default.
    #[serde(default)]
    pub expiry: Option<u64>,
}

impl From<ShortenRequest> for ShortenCommand {
    fn from(request: ShortenRequest) -> Self {
        Self {
            url: request.url,
            short: request.short.filter(|s| !s.is_empty()),
            expiry_hours: request.expiry,
        }
    }
}

/// Successful shortening result.
///
/// # Example
///
/// ```json
/// {
///   "url": "https://example.com/a/b",
///   "short": "localhost:3000/Ab3dE9",
///   "expiry": 24,
///   "rate_limit": 9,
///   "rate_limit_reset": 30
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    /// Stored target URL after normalization.
    pub url: String,
    /// Full short URL.
    pub short: String,
    /// Lifetime in hours.
    pub expiry: u64,
    /// Shortening requests left in the current window.
    pub rate_limit: i64,
    /// Minutes until the window resets, rounded up.
    pub rate_limit_reset: u64,
}

impl From<ShortenOutcome> for ShortenResponse {
    fn from(outcome: ShortenOutcome) -> Self {
        Self {
            url: outcome.link.target_url,
            short: outcome.short_url,
            expiry: outcome.expiry_hours,
            rate_limit: outcome.rate_limit.remaining,
            rate_limit_reset: whole_minutes(outcome.rate_limit.reset_in),
        }
    }
}
