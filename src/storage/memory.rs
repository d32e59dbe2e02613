use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{CacheEntry, CacheStore, StorageError};

/// In-process store: an append-only list in insertion order.
///
/// Clones share the same entries.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCacheStore {
    entries: Arc<RwLock<Vec<CacheEntry>>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn insert(&self, entry: &CacheEntry) -> Result<(), StorageError> {
        self.entries.write().push(entry.clone());
        Ok(())
    }

    async fn scan(&self, now: DateTime<Utc>) -> Result<Vec<CacheEntry>, StorageError> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.is_live(now))
            .cloned()
            .collect())
    }

    async fn recent(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, StorageError> {
        Ok(self
            .entries
            .read()
            .iter()
            .rev()
            .filter(|e| e.is_live(now))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        Ok(self.entries.read().iter().filter(|e| e.is_live(now)).count())
    }

    async fn clear(&self) -> Result<usize, StorageError> {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.is_live(now));
        Ok(before - entries.len())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
