//! In-process key/value store.

use super::service::{KeyValueStore, Namespace, StoreError, StoreResult};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }

    fn parse_integer(&self, key: &str) -> StoreResult<i64> {
        self.value
            .parse()
            .map_err(|_| StoreError::NotAnInteger(key.to_string()))
    }
}

/// Store backed by a sharded in-process map.
///
/// Per-key atomicity comes from DashMap's shard locks: every operation holds
/// the shard guard for the whole read-modify-write. Expired entries are
/// invisible to readers and removed by [`MemoryStore::purge_expired`].
///
/// Expiry is measured with tokio's clock, so tests can drive it with
/// `tokio::time::pause` and `tokio::time::advance`.
///
/// # Use Cases
///
/// - Development environments without Redis
/// - Unit and integration tests
/// - Fallback when Redis is unreachable at startup
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<(Namespace, String), Entry>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        debug!("Using MemoryStore (state is not shared between processes)");
        Self {
            entries: DashMap::new(),
        }
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of entries currently held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn map_key(namespace: Namespace, key: &str) -> (Namespace, String) {
        (namespace, key.to_string())
    }

    fn adjust_existing(&self, namespace: Namespace, key: &str, delta: i64) -> StoreResult<Option<i64>> {
        let now = Instant::now();
        let Some(mut entry) = self.entries.get_mut(&Self::map_key(namespace, key)) else {
            return Ok(None);
        };
        if !entry.is_live(now) {
            return Ok(None);
        }

        let updated = entry.parse_integer(&namespace.key(key))? + delta;
        entry.value = updated.to_string();
        Ok(Some(updated))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, namespace: Namespace, key: &str) -> StoreResult<Option<String>> {
        let now = Instant::now();
        let value = self
            .entries
            .get(&Self::map_key(namespace, key))
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone());
        trace!(key = %namespace.key(key), hit = value.is_some(), "memory GET");
        Ok(value)
    }

    async fn set(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<()> {
        self.entries
            .insert(Self::map_key(namespace, key), Entry::new(value, ttl));
        trace!(key = %namespace.key(key), ?ttl, "memory SET");
        Ok(())
    }

    async fn set_if_absent(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        let now = Instant::now();
        let written = match self.entries.entry(Self::map_key(namespace, key)) {
            MapEntry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    false
                } else {
                    occupied.insert(Entry::new(value, Some(ttl)));
                    true
                }
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(value, Some(ttl)));
                true
            }
        };
        trace!(key = %namespace.key(key), written, "memory SET NX");
        Ok(written)
    }

    async fn delete(&self, namespace: Namespace, key: &str) -> StoreResult<bool> {
        let now = Instant::now();
        let removed = self.entries.remove(&Self::map_key(namespace, key));
        Ok(removed.is_some_and(|(_, entry)| entry.is_live(now)))
    }

    async fn decrement(&self, namespace: Namespace, key: &str) -> StoreResult<Option<i64>> {
        self.adjust_existing(namespace, key, -1)
    }

    async fn increment_existing(
        &self,
        namespace: Namespace,
        key: &str,
    ) -> StoreResult<Option<i64>> {
        self.adjust_existing(namespace, key, 1)
    }

    async fn increment(&self, namespace: Namespace, key: &str) -> StoreResult<i64> {
        let now = Instant::now();
        match self.entries.entry(Self::map_key(namespace, key)) {
            MapEntry::Occupied(mut occupied) => {
                if !occupied.get().is_live(now) {
                    occupied.insert(Entry::new("1", None));
                    return Ok(1);
                }
                let entry = occupied.get_mut();
                let updated = entry.parse_integer(&namespace.key(key))? + 1;
                entry.value = updated.to_string();
                Ok(updated)
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new("1", None));
                Ok(1)
            }
        }
    }

    async fn time_to_live(
        &self,
        namespace: Namespace,
        key: &str,
    ) -> StoreResult<Option<Duration>> {
        let now = Instant::now();
        let ttl = self
            .entries
            .get(&Self::map_key(namespace, key))
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at.saturating_duration_since(now));
        Ok(ttl)
    }

    async fn ping(&self) -> bool {
        true
    }
}

/// Periodically purges expired entries from `store`.
///
/// Runs until the task is aborted or the runtime shuts down.
pub async fn run_sweeper(store: Arc<MemoryStore>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let purged = store.purge_expired();
        if purged > 0 {
            debug!(purged, remaining = store.len(), "Swept expired keys");
        }
    }
}
