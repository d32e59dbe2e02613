//! Text embedding.
//!
//! - [`OpenAiEmbedder`] calls the OpenAI embeddings endpoint.
//! - [`StubEmbedder`] is deterministic and offline (mock provider mode, tests).
//! - [`MemoizedEmbedder`] wraps either and memoizes by query fingerprint.

mod error;
/// Memoizing wrapper.
pub mod memo;
/// OpenAI HTTP embedder.
pub mod openai;
#[cfg(any(test, feature = "mock"))]
pub mod scripted;
/// Offline hashing embedder.
pub mod stub;

pub use error::EmbeddingError;
pub use memo::MemoizedEmbedder;
pub use openai::OpenAiEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use scripted::ScriptedEmbedder;
pub use stub::StubEmbedder;

use async_trait::async_trait;

/// Produces a fixed-length vector for a piece of text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds `text`. Identical input yields identical output within the memo window.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;

    /// `true` when vectors come from the offline stub rather than a real model.
    fn is_stub(&self) -> bool {
        false
    }
}
