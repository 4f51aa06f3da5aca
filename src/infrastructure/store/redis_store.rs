//! Redis-backed key/value store.

use super::service::{KeyValueStore, Namespace, StoreError, StoreResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisResult, Script, aio::ConnectionManager};
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Adds `ARGV[1]` to `KEYS[1]` only if the key exists. Returns nil otherwise.
///
/// Plain `INCRBY`/`DECR` would recreate an expired quota window without a TTL.
static ADJUST_EXISTING: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 1 then
            return redis.call('INCRBY', KEYS[1], ARGV[1])
        end
        return false
        ",
    )
});

/// Redis store implementation.
///
/// Uses a shared `ConnectionManager` which multiplexes commands over one
/// connection and reconnects transparently. Every command is bounded by the
/// configured operation timeout.
pub struct RedisStore {
    client: ConnectionManager,
    op_timeout: Duration,
    key_prefix: String,
}

impl RedisStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `op_timeout` - upper bound for every store command; controlled via
    ///   `STORE_TIMEOUT_MS`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid, the connection
    /// cannot be established, or the PING check fails.
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> StoreResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| StoreError::Connection(format!("Failed to create Redis client: {}", e)))?;

        let manager = tokio::time::timeout(op_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::Timeout(op_timeout))?
            .map_err(|e| StoreError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        tokio::time::timeout(op_timeout, test_conn.ping::<()>())
            .await
            .map_err(|_| StoreError::Timeout(op_timeout))?
            .map_err(|e| StoreError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            op_timeout,
            key_prefix: "snaplink:".to_string(),
        })
    }

    /// Constructs the full Redis key with global and namespace prefixes.
    fn build_key(&self, namespace: Namespace, key: &str) -> String {
        format!("{}{}", self.key_prefix, namespace.key(key))
    }

    /// Awaits a Redis command under the operation timeout.
    async fn run<T>(
        &self,
        command: &'static str,
        key: &str,
        fut: impl Future<Output = RedisResult<T>>,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(command, key, error = %e, "Redis command failed");
                Err(StoreError::Operation(e.to_string()))
            }
            Err(_) => {
                warn!(command, key, timeout = ?self.op_timeout, "Redis command timed out");
                Err(StoreError::Timeout(self.op_timeout))
            }
        }
    }

    async fn adjust_existing(
        &self,
        namespace: Namespace,
        key: &str,
        delta: i64,
    ) -> StoreResult<Option<i64>> {
        let key = self.build_key(namespace, key);
        let mut conn = self.client.clone();

        let mut invocation = ADJUST_EXISTING.key(&key);
        invocation.arg(delta);
        let updated = self
            .run("INCRBY", &key, invocation.invoke_async::<Option<i64>>(&mut conn))
            .await?;
        trace!(key, delta, ?updated, "Redis adjust existing");
        Ok(updated)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, namespace: Namespace, key: &str) -> StoreResult<Option<String>> {
        let key = self.build_key(namespace, key);
        let mut conn = self.client.clone();

        let value = self
            .run("GET", &key, conn.get::<_, Option<String>>(&key))
            .await?;
        debug!(key, hit = value.is_some(), "Redis GET");
        Ok(value)
    }

    async fn set(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<()> {
        let key = self.build_key(namespace, key);
        let mut conn = self.client.clone();

        match ttl {
            Some(ttl) => {
                let millis = ttl.as_millis().max(1) as u64;
                self.run("PSETEX", &key, conn.pset_ex::<_, _, ()>(&key, value, millis))
                    .await?
            }
            None => self.run("SET", &key, conn.set::<_, _, ()>(&key, value)).await?,
        }
        debug!(key, ?ttl, "Redis SET");
        Ok(())
    }

    async fn set_if_absent(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        let key = self.build_key(namespace, key);
        let mut conn = self.client.clone();

        let millis = ttl.as_millis().max(1) as u64;
        let mut cmd = redis::cmd("SET");
        cmd.arg(&key).arg(value).arg("NX").arg("PX").arg(millis);

        let reply = self
            .run("SET NX", &key, cmd.query_async::<Option<String>>(&mut conn))
            .await?;
        let written = reply.is_some();
        debug!(key, written, "Redis SET NX");
        Ok(written)
    }

    async fn delete(&self, namespace: Namespace, key: &str) -> StoreResult<bool> {
        let key = self.build_key(namespace, key);
        let mut conn = self.client.clone();

        let deleted = self.run("DEL", &key, conn.del::<_, i64>(&key)).await?;
        Ok(deleted > 0)
    }

    async fn decrement(&self, namespace: Namespace, key: &str) -> StoreResult<Option<i64>> {
        self.adjust_existing(namespace, key, -1).await
    }

    async fn increment_existing(
        &self,
        namespace: Namespace,
        key: &str,
    ) -> StoreResult<Option<i64>> {
        self.adjust_existing(namespace, key, 1).await
    }

    async fn increment(&self, namespace: Namespace, key: &str) -> StoreResult<i64> {
        let key = self.build_key(namespace, key);
        let mut conn = self.client.clone();

        self.run("INCR", &key, conn.incr::<_, _, i64>(&key, 1)).await
    }

    async fn time_to_live(
        &self,
        namespace: Namespace,
        key: &str,
    ) -> StoreResult<Option<Duration>> {
        let key = self.build_key(namespace, key);
        let mut conn = self.client.clone();

        // -2: no such key, -1: key without expiry
        let millis = self.run("PTTL", &key, conn.pttl::<_, i64>(&key)).await?;
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }

    async fn ping(&self) -> bool {
        let mut conn = self.client.clone();
        matches!(
            tokio::time::timeout(self.op_timeout, conn.ping::<()>()).await,
            Ok(Ok(()))
        )
    }
}
