//! Test embedder returning preset vectors.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Embedder, EmbeddingError};

/// Returns a preset vector for each scripted text and a fallback for everything else.
///
/// Clones share the script and the call counter.
#[derive(Debug, Clone)]
pub struct ScriptedEmbedder {
    dimension: usize,
    script: Arc<RwLock<HashMap<String, Vec<f32>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            script: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Scripts `text` to embed as `vector`.
    pub fn with(self, text: &str, vector: Vec<f32>) -> Self {
        self.set(text, vector);
        self
    }

    pub fn set(&self, text: &str, vector: Vec<f32>) {
        self.script.write().insert(text.to_string(), vector);
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Unit vector along the last axis; orthogonal to anything built on other axes.
    fn fallback(&self) -> Vec<f32> {
        let mut v = vec![0.0; self.dimension];
        if let Some(last) = v.last_mut() {
            *last = 1.0;
        }
        v
    }

    /// Two-axis unit vector with cosine `similarity` against `[1, 0, ...]`.
    pub fn vector_with_similarity(dimension: usize, similarity: f32) -> Vec<f32> {
        let mut v = vec![0.0; dimension];
        v[0] = similarity;
        if dimension > 1 {
            v[1] = (1.0 - similarity * similarity).max(0.0).sqrt();
        }
        v
    }

    /// The reference axis `[1, 0, ...]`.
    pub fn axis(dimension: usize) -> Vec<f32> {
        Self::vector_with_similarity(dimension, 1.0)
    }
}

#[async_trait]
impl Embedder for ScriptedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .script
            .read()
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_stub(&self) -> bool {
        true
    }
}
