//! Fixed-window request quotas per client address.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::entities::{QuotaRecord, RateLimitDecision};
use crate::infrastructure::store::{KeyValueStore, Namespace, StoreError, StoreResult};

/// Times a window may vanish between opening and decrementing it before
/// the check gives up.
const MAX_WINDOW_ATTEMPTS: usize = 3;

/// Per-client quota tracker on the quota namespace.
///
/// A client's first request opens a window holding `quota` units that
/// expires after `window`. Every admitted request consumes one unit.
///
/// # Atomicity
///
/// Admission and consumption are a single atomic decrement: the count is
/// decremented first and the request is rejected (and the unit put back) if
/// the result is negative. Concurrent requests from one client therefore
/// never exceed the quota, unlike a read-then-decrement sequence.
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    quota: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, quota: u32, window: Duration) -> Self {
        Self {
            store,
            quota,
            window,
        }
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Checks the client's quota and consumes one unit if admitted.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store fails, or if the window keeps
    /// expiring between opening and decrementing it.
    pub async fn check_and_consume(&self, client_key: &str) -> StoreResult<RateLimitDecision> {
        for _ in 0..MAX_WINDOW_ATTEMPTS {
            let opened = self
                .store
                .set_if_absent(
                    Namespace::Quota,
                    client_key,
                    &self.quota.to_string(),
                    self.window,
                )
                .await?;
            if opened {
                debug!(client = client_key, quota = self.quota, "Opened quota window");
            }

            let Some(remaining) = self.store.decrement(Namespace::Quota, client_key).await? else {
                // Window expired between the two calls.
                continue;
            };

            if remaining < 0 {
                if let Err(e) = self
                    .store
                    .increment_existing(Namespace::Quota, client_key)
                    .await
                {
                    warn!(client = client_key, error = %e, "Failed to restore exhausted quota");
                }
                let reset_in = self.reset_in(client_key).await?;
                debug!(client = client_key, ?reset_in, "Quota exhausted");
                return Ok(RateLimitDecision::rejected(reset_in));
            }

            let reset_in = self.reset_in(client_key).await?;
            return Ok(RateLimitDecision::admitted(remaining, reset_in));
        }

        Err(StoreError::Operation(format!(
            "quota window for {} expired {} times during admission",
            client_key, MAX_WINDOW_ATTEMPTS
        )))
    }

    /// Returns one unit to the client's current window.
    ///
    /// Used when an admitted request fails later. Does nothing if the window
    /// has already expired.
    pub async fn refund(&self, client_key: &str) -> StoreResult<()> {
        let restored = self
            .store
            .increment_existing(Namespace::Quota, client_key)
            .await?;
        debug!(client = client_key, ?restored, "Refunded quota unit");
        Ok(())
    }

    /// Reads the client's quota without consuming anything.
    pub async fn snapshot(&self, client_key: &str) -> StoreResult<Option<QuotaRecord>> {
        let Some(value) = self.store.get(Namespace::Quota, client_key).await? else {
            return Ok(None);
        };
        let remaining = value
            .parse()
            .map_err(|_| StoreError::NotAnInteger(Namespace::Quota.key(client_key)))?;
        let window_expires_at = self
            .store
            .time_to_live(Namespace::Quota, client_key)
            .await?
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .map(|ttl| Utc::now() + ttl);

        Ok(Some(QuotaRecord {
            client_key: client_key.to_string(),
            remaining,
            window_expires_at,
        }))
    }

    /// Closes the client's window so the next request starts a fresh one.
    pub async fn reset(&self, client_key: &str) -> StoreResult<bool> {
        self.store.delete(Namespace::Quota, client_key).await
    }

    async fn reset_in(&self, client_key: &str) -> StoreResult<Duration> {
        let ttl = self
            .store
            .time_to_live(Namespace::Quota, client_key)
            .await?
            .filter(|ttl| !ttl.is_zero());

        Ok(ttl.unwrap_or(self.window))
    }
}
