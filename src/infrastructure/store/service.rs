//! Key/value store trait, namespaces, and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store operation error: {0}")]
    Operation(String),

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Value under '{0}' is not an integer")]
    NotAnInteger(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Logical partition of the store.
///
/// Both namespaces live in one backend and are separated by key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Short identifier -> target URL. Every record carries its own TTL.
    Links,
    /// Client address -> remaining quota, plus the global redirect counter.
    Quota,
}

impl Namespace {
    /// Key prefix used by backends that share a single keyspace.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Links => "link:",
            Self::Quota => "quota:",
        }
    }

    /// Builds the physical key for `key` in this namespace.
    pub fn key(self, key: &str) -> String {
        format!("{}{}", self.prefix(), key)
    }
}

/// Key/value store with per-key expiration.
///
/// All operations on a single key are atomic with respect to each other.
/// Operations spanning several keys are not transactional. A key whose TTL
/// has elapsed behaves exactly like an absent key.
///
/// # Implementations
///
/// - [`crate::infrastructure::store::RedisStore`] - Redis-backed store
/// - [`crate::infrastructure::store::MemoryStore`] - In-process store for development and tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, namespace: Namespace, key: &str) -> StoreResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// `ttl = None` stores the key without expiry.
    async fn set(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<()>;

    /// Writes `value` only if no live key exists.
    ///
    /// Returns `true` when the value was written.
    async fn set_if_absent(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<bool>;

    /// Removes `key`. Returns `true` if a live key was removed.
    async fn delete(&self, namespace: Namespace, key: &str) -> StoreResult<bool>;

    /// Atomically decrements an existing integer key, keeping its TTL.
    ///
    /// Returns `None` without creating anything when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotAnInteger`] if the stored value is not an integer.
    async fn decrement(&self, namespace: Namespace, key: &str) -> StoreResult<Option<i64>>;

    /// Atomically increments an existing integer key, keeping its TTL.
    ///
    /// Returns `None` without creating anything when the key is absent.
    async fn increment_existing(&self, namespace: Namespace, key: &str)
    -> StoreResult<Option<i64>>;

    /// Atomically increments `key`, creating it at zero without expiry when absent.
    async fn increment(&self, namespace: Namespace, key: &str) -> StoreResult<i64>;

    /// Remaining time to live of `key`.
    ///
    /// Returns `None` if the key is absent or has no expiry.
    async fn time_to_live(&self, namespace: Namespace, key: &str)
    -> StoreResult<Option<Duration>>;

    /// Checks if the backend is reachable.
    async fn ping(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_keys_do_not_overlap() {
        assert_eq!(Namespace::Links.key("abc"), "link:abc");
        assert_eq!(Namespace::Quota.key("abc"), "quota:abc");
        assert_ne!(Namespace::Links.key("x"), Namespace::Quota.key("x"));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotAnInteger("quota:1.2.3.4".to_string());
        assert_eq!(err.to_string(), "Value under 'quota:1.2.3.4' is not an integer");

        let err = StoreError::Timeout(Duration::from_millis(50));
        assert!(err.to_string().contains("timed out"));
    }
}
