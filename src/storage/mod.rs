//! Cache entry storage.
//!
//! [`CacheStore`] is the seam between the cache logic and the key-value engine:
//! [`RedisCacheStore`] in production, [`InMemoryCacheStore`] for tests and
//! `SEMCACHE_STORE=memory`.

pub mod error;
pub mod memory;
mod model;
pub mod redis_store;

pub use error::StorageError;
pub use memory::InMemoryCacheStore;
pub use model::CacheEntry;
pub use redis_store::{RedisCacheStore, RedisStoreConfig};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Ordered, expiring storage for [`CacheEntry`] values.
///
/// Implementations must make each `insert` atomic (no partially written entry is ever
/// returned) and must return entries in creation order, oldest first.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Stores a new entry; it expires at `entry.expires_at`.
    async fn insert(&self, entry: &CacheEntry) -> Result<(), StorageError>;

    /// All entries still live at `now`, oldest first.
    async fn scan(&self, now: DateTime<Utc>) -> Result<Vec<CacheEntry>, StorageError>;

    /// Up to `limit` live entries, newest first.
    async fn recent(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, StorageError>;

    /// Number of live entries.
    async fn count(&self, now: DateTime<Utc>) -> Result<usize, StorageError>;

    /// Deletes every entry regardless of expiry; returns how many were removed.
    async fn clear(&self) -> Result<usize, StorageError>;

    /// Physically removes expired entries; returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StorageError>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), StorageError>;
}
