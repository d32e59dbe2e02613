use std::fmt;

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::generation::GenerationError;
use crate::storage::StorageError;

/// External service a cache operation depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Embedding,
    Generation,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upstream::Embedding => write!(f, "embedding service"),
            Upstream::Generation => write!(f, "generation service"),
        }
    }
}

#[derive(Debug, Error)]
/// Errors returned by [`SemanticCache`](super::SemanticCache).
pub enum CacheError {
    /// The request itself is unusable (e.g. empty query).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The embedding or generation service failed.
    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable {
        service: Upstream,
        reason: String,
        /// `true` when fixing it requires configuration (missing key, wrong model dimension).
        configuration: bool,
    },

    /// The key-value store failed.
    #[error("store error: {0}")]
    Store(#[from] StorageError),
}

impl CacheError {
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CacheError::UpstreamUnavailable {
                configuration: true,
                ..
            }
        )
    }
}

impl From<EmbeddingError> for CacheError {
    fn from(err: EmbeddingError) -> Self {
        CacheError::UpstreamUnavailable {
            service: Upstream::Embedding,
            configuration: err.is_configuration_error(),
            reason: err.to_string(),
        }
    }
}

impl From<GenerationError> for CacheError {
    fn from(err: GenerationError) -> Self {
        CacheError::UpstreamUnavailable {
            service: Upstream::Generation,
            configuration: err.is_configuration_error(),
            reason: err.to_string(),
        }
    }
}

/// Convenience result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
