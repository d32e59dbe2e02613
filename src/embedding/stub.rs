use async_trait::async_trait;

use super::{Embedder, EmbeddingError};
use crate::constants::DEFAULT_EMBEDDING_DIM;
use crate::hashing::{hash_to_u64, normalize_query};

/// Offline embedder: signed feature hashing of normalized word tokens, L2-normalized.
///
/// Queries with the same words score 1.0 against each other regardless of case or
/// punctuation; queries sharing no words score ~0. Text with no word characters maps to
/// the zero vector, which never matches anything.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_EMBEDDING_DIM)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Synchronous form of [`Embedder::embed`].
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let normalized = normalize_query(text);

        for token in normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let h = hash_to_u64(token.as_bytes());
            let bucket = (h % self.dimension as u64) as usize;
            let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_sync(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_stub(&self) -> bool {
        true
    }
}
