//! Link record storage and the global redirect counter.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::entities::LinkRecord;
use crate::error::AppError;
use crate::infrastructure::store::{KeyValueStore, Namespace, StoreResult};

/// Key of the redirect counter inside the quota namespace.
pub const REDIRECT_COUNTER_KEY: &str = "counter";

/// Creates and looks up link records in the link namespace.
///
/// The stored value is the target URL; the record's lifetime is the key's TTL.
pub struct LinkRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl LinkRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stores a new link that expires after `ttl`.
    ///
    /// The write is create-only, so a concurrent request that claimed the same
    /// identifier first wins.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyExists`] if a live record already uses `id`.
    /// Returns [`AppError::SaveFailed`] on store errors.
    pub async fn create(
        &self,
        id: &str,
        target_url: &str,
        ttl: Duration,
    ) -> Result<LinkRecord, AppError> {
        let written = self
            .store
            .set_if_absent(Namespace::Links, id, target_url, ttl)
            .await
            .map_err(AppError::SaveFailed)?;

        if !written {
            return Err(AppError::AlreadyExists);
        }

        debug!(id, target_url, ttl_secs = ttl.as_secs(), "Link created");
        Ok(LinkRecord::expiring_in(
            id.to_string(),
            target_url.to_string(),
            ttl,
        ))
    }

    /// Looks up the target URL of a live link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the identifier is unknown or expired.
    /// Returns [`AppError::Storage`] on store errors.
    pub async fn resolve(&self, id: &str) -> Result<String, AppError> {
        self.store
            .get(Namespace::Links, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Returns true if a live link uses `id`.
    pub async fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.store.get(Namespace::Links, id).await?.is_some())
    }

    /// Looks up a live link together with its remaining lifetime.
    pub async fn find(&self, id: &str) -> StoreResult<Option<LinkRecord>> {
        let Some(target_url) = self.store.get(Namespace::Links, id).await? else {
            return Ok(None);
        };
        let ttl = self
            .store
            .time_to_live(Namespace::Links, id)
            .await?
            .unwrap_or(Duration::ZERO);

        Ok(Some(LinkRecord::expiring_in(id.to_string(), target_url, ttl)))
    }

    /// Removes a link before it expires. Returns `true` if it was live.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.store.delete(Namespace::Links, id).await
    }

    /// Counts one redirect and returns the new total.
    pub async fn record_redirect(&self) -> StoreResult<i64> {
        self.store
            .increment(Namespace::Quota, REDIRECT_COUNTER_KEY)
            .await
    }

    /// Current value of the redirect counter.
    pub async fn redirect_count(&self) -> StoreResult<i64> {
        let value = self
            .store
            .get(Namespace::Quota, REDIRECT_COUNTER_KEY)
            .await?;

        Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    /// Resets the redirect counter to zero.
    pub async fn reset_redirect_count(&self) -> StoreResult<()> {
        self.store
            .set(Namespace::Quota, REDIRECT_COUNTER_KEY, "0", None)
            .await
    }
}
