//! Cross-cutting, shared constants.
//!
//! Derived values (key names, per-token prices) live next to the code that uses them;
//! this module only holds the defaults several modules must agree on.

/// Dimension of `text-embedding-3-small` vectors.
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Minimum cosine similarity for a cached answer to be reused.
///
/// This is a similarity (higher is closer), compared with `>=`.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.85;

/// Retention window for cache entries, in seconds.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Number of entries reported by `stats`.
pub const DEFAULT_RECENT_ENTRIES: usize = 10;

/// Prefix shared by every Redis key the cache owns.
pub const CACHE_KEY_PREFIX: &str = "semantic-cache";

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Upper bound on completion tokens; reasoning models spend part of it internally.
pub const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 4000;

/// Error returned when an embedding does not have the expected length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// Use this at module boundaries so a misconfigured embedding model fails loudly instead
/// of silently scoring every cached entry as dissimilar.
///
/// # Example
///
/// ```
/// use semcache::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(1536, DEFAULT_EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(768, DEFAULT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
