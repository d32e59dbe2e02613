use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use tracing::debug;

use super::{Embedder, EmbeddingError};
use crate::hashing::query_fingerprint;

/// Wraps an [`Embedder`], memoizing vectors by query fingerprint (lowercase, trimmed).
///
/// Bounded (LRU) and time-limited, so a swapped embedding model is picked up after
/// `ttl` at the latest.
pub struct MemoizedEmbedder<E> {
    inner: E,
    memo: Cache<[u8; 32], Arc<Vec<f32>>>,
}

impl<E: Embedder> MemoizedEmbedder<E> {
    const DEFAULT_CAPACITY: u64 = 1_024;
    const DEFAULT_TTL: Duration = Duration::from_secs(3600);

    pub fn new(inner: E) -> Self {
        Self::with_capacity(inner, Self::DEFAULT_CAPACITY, Self::DEFAULT_TTL)
    }

    pub fn with_capacity(inner: E, capacity: u64, ttl: Duration) -> Self {
        Self {
            inner,
            memo: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Number of memoized vectors (after pending maintenance).
    pub fn len(&self) -> u64 {
        self.memo.run_pending_tasks();
        self.memo.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> std::fmt::Debug for MemoizedEmbedder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoizedEmbedder")
            .field("entries", &self.memo.entry_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<E: Embedder> Embedder for MemoizedEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let key = query_fingerprint(text);
        if let Some(hit) = self.memo.get(&key) {
            debug!("Embedding memo hit");
            return Ok(hit.as_ref().clone());
        }

        let vector = self.inner.embed(text).await?;
        self.memo.insert(key, Arc::new(vector.clone()));
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn is_stub(&self) -> bool {
        self.inner.is_stub()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Unavailable {
                reason: "down".to_string(),
            })
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_memoizes_identical_text() {
        let memo = MemoizedEmbedder::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
        });

        let first = memo.embed("What is Redis?").await.unwrap();
        let second = memo.embed("What is Redis?").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(memo.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_memo_key_is_normalized() {
        let memo = MemoizedEmbedder::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
        });

        memo.embed("What is Redis?").await.unwrap();
        memo.embed("  what is redis?  ").await.unwrap();

        assert_eq!(memo.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_text_not_shared() {
        let memo = MemoizedEmbedder::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
        });

        memo.embed("one").await.unwrap();
        memo.embed("two").await.unwrap();

        assert_eq!(memo.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.len(), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_memoized() {
        let memo = MemoizedEmbedder::new(FailingEmbedder);

        assert!(memo.embed("x").await.is_err());
        assert!(memo.is_empty());
    }

    #[test]
    fn test_delegates_metadata() {
        let memo = MemoizedEmbedder::new(crate::embedding::StubEmbedder::with_dimension(8));
        assert_eq!(memo.dimension(), 8);
        assert!(memo.is_stub());
    }
}
