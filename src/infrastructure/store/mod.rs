//! TTL-governed key/value storage for link and quota records.
//!
//! Provides a [`KeyValueStore`] trait with two implementations:
//! - [`RedisStore`] - Production Redis-backed store
//! - [`MemoryStore`] - In-process store for development, tests, and fallback

mod memory_store;
mod redis_store;
mod service;

pub use memory_store::{MemoryStore, run_sweeper};
pub use redis_store::RedisStore;
pub use service::{KeyValueStore, Namespace, StoreError, StoreResult};

#[cfg(test)]
pub use service::MockKeyValueStore;
