//! Redis-backed cache store.
//!
//! Layout (prefix `semantic-cache` by default):
//! - `{prefix}:entry:{id}` hash per entry, with `EXPIRE` set to the entry's lifetime.
//! - `{prefix}:index` sorted set of entry ids scored by creation time (microseconds).
//!
//! The index gives scans a stable creation order. Redis expires the hashes on its own;
//! index members that outlive their hash are pruned lazily by scans and by
//! [`CacheStore::purge_expired`].

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info, instrument, warn};

use super::{CacheEntry, CacheStore, StorageError};
use crate::constants::CACHE_KEY_PREFIX;

/// Connection and key layout settings for [`RedisCacheStore`].
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g. `redis://127.0.0.1:6379`).
    pub url: String,
    /// Namespace for every key the store touches.
    pub key_prefix: String,
    /// `COUNT` hint for `SCAN` during [`CacheStore::clear`].
    pub scan_batch: usize,
    pub connection_timeout: Duration,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: CACHE_KEY_PREFIX.to_string(),
            scan_batch: 100,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn entry_key(&self, id: &str) -> String {
        format!("{}:entry:{}", self.key_prefix, id)
    }

    pub fn index_key(&self) -> String {
        format!("{}:index", self.key_prefix)
    }

    fn entry_key_prefix(&self) -> String {
        format!("{}:entry:", self.key_prefix)
    }

    fn match_pattern(&self) -> String {
        format!("{}:*", self.key_prefix)
    }
}

/// Cache store over a multiplexed Redis connection.
///
/// [`ConnectionManager`] reconnects on its own and is cheap to clone per command.
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: ConnectionManager,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCacheStore {
    /// Connects to Redis.
    pub async fn connect(config: RedisStoreConfig) -> Result<Self, StorageError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            StorageError::Connection(format!("failed to create Redis client: {}", e))
        })?;

        let connection = tokio::time::timeout(
            config.connection_timeout,
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| {
            StorageError::Connection(format!(
                "timed out connecting to Redis after {:?}",
                config.connection_timeout
            ))
        })?
        .map_err(|e| StorageError::Connection(format!("failed to connect to Redis: {}", e)))?;

        info!(key_prefix = %config.key_prefix, "Redis cache store connected");
        Ok(Self { connection, config })
    }

    pub async fn with_url(url: impl Into<String>) -> Result<Self, StorageError> {
        Self::connect(RedisStoreConfig::new(url)).await
    }

    pub fn config(&self) -> &RedisStoreConfig {
        &self.config
    }

    /// Loads the hashes for `ids` in one pipeline, keeping the order of `ids`.
    ///
    /// Ids whose hash is gone are removed from the index; undecodable hashes are skipped.
    async fn load_ordered(
        &self,
        ids: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Vec<CacheEntry>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.connection.clone();
        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.hgetall(self.config.entry_key(id));
        }
        let hashes: Vec<HashMap<String, String>> = pipe.query_async(&mut conn).await?;

        let mut entries = Vec::with_capacity(ids.len());
        let mut stale = Vec::new();
        for (id, fields) in ids.into_iter().zip(hashes) {
            if fields.is_empty() {
                stale.push(id);
                continue;
            }
            match CacheEntry::from_fields(&id, &fields) {
                Ok(entry) if entry.is_live(now) => entries.push(entry),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Skipping undecodable cache entry"),
            }
        }

        if !stale.is_empty() {
            debug!(count = stale.len(), "Pruning index members with no entry");
            let _: i64 = conn.zrem(self.config.index_key(), &stale).await?;
        }

        Ok(entries)
    }

    /// Removes index members whose hash no longer exists; returns how many were removed.
    async fn prune_index(&self) -> Result<usize, StorageError> {
        let mut conn = self.connection.clone();
        let ids: Vec<String> = conn.zrange(self.config.index_key(), 0, -1).await?;
        if ids.is_empty() {
            return Ok(0);
        }

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.exists(self.config.entry_key(id));
        }
        let present: Vec<bool> = pipe.query_async(&mut conn).await?;

        let stale: Vec<String> = ids
            .into_iter()
            .zip(present)
            .filter_map(|(id, exists)| (!exists).then_some(id))
            .collect();

        if stale.is_empty() {
            return Ok(0);
        }
        let removed: i64 = conn.zrem(self.config.index_key(), &stale).await?;
        Ok(removed.max(0) as usize)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    #[instrument(skip(self, entry), fields(id = %entry.id))]
    async fn insert(&self, entry: &CacheEntry) -> Result<(), StorageError> {
        let key = self.config.entry_key(&entry.id);
        let fields = entry.to_fields()?;
        let ttl_secs = entry.ttl_at(entry.created_at).as_secs().max(1) as i64;

        let mut conn = self.connection.clone();
        let _: () = redis::pipe()
            .atomic()
            .hset_multiple(&key, &fields)
            .ignore()
            .expire(&key, ttl_secs)
            .ignore()
            .zadd(
                self.config.index_key(),
                &entry.id,
                entry.created_at_micros() as f64,
            )
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(ttl_secs, "Cache entry stored");
        Ok(())
    }

    async fn scan(&self, now: DateTime<Utc>) -> Result<Vec<CacheEntry>, StorageError> {
        let mut conn = self.connection.clone();
        let ids: Vec<String> = conn.zrange(self.config.index_key(), 0, -1).await?;
        self.load_ordered(ids, now).await
    }

    async fn recent(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, StorageError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.prune_index().await?;

        let mut conn = self.connection.clone();
        let ids: Vec<String> = conn
            .zrevrange(self.config.index_key(), 0, limit as isize - 1)
            .await?;
        self.load_ordered(ids, now).await
    }

    async fn count(&self, _now: DateTime<Utc>) -> Result<usize, StorageError> {
        self.prune_index().await?;

        let mut conn = self.connection.clone();
        let count: usize = conn.zcard(self.config.index_key()).await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<usize, StorageError> {
        let mut conn = self.connection.clone();
        let pattern = self.config.match_pattern();
        let entry_prefix = self.config.entry_key_prefix();

        let mut cursor = 0u64;
        let mut deleted_entries = 0usize;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(self.config.scan_batch)
                .query_async(&mut conn)
                .await?;

            let (entry_keys, other_keys): (Vec<String>, Vec<String>) =
                keys.into_iter().partition(|k| k.starts_with(&entry_prefix));
            // SCAN may repeat keys across batches; DEL only counts keys it actually removed.
            if !entry_keys.is_empty() {
                let removed: i64 = conn.del(&entry_keys).await?;
                deleted_entries += removed.max(0) as usize;
            }
            if !other_keys.is_empty() {
                let _: i64 = conn.del(&other_keys).await?;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        info!(deleted = deleted_entries, "Cleared cache entries");
        Ok(deleted_entries)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, StorageError> {
        self.prune_index().await
    }

    async fn ping(&self) -> Result<(), StorageError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
