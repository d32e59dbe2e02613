//! Semcache library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`SemanticCache`], [`Resolution`], [`CacheStats`] - Lookup, miss handling, clear, stats
//! - [`CacheEntry`], [`CacheStore`] - Storage format and backends
//!
//! ## Providers
//! - [`Embedder`]: [`OpenAiEmbedder`], [`StubEmbedder`], [`MemoizedEmbedder`]
//! - [`Generator`]: [`GenaiGenerator`], [`MockGenerator`]
//!
//! ## Utilities
//! - [`cosine_similarity`], [`best_match`] - Similarity scoring
//! - [`query_fingerprint`] - Cache and single-flight keys
//! - [`validate_embedding_dim`] - Dimension validation
//!
//! ## Test/Mock Support
//! Scripted test doubles are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod generation;
pub mod hashing;
pub mod similarity;
pub mod storage;

pub use cache::{
    CacheError, CacheResult, CacheStats, CacheStatus, ClearOutcome, ExpiryReaper,
    REAPER_INTERVAL_SECS, Resolution, SEMCACHE_STATUS_HEADER, SemanticCache, SemanticCacheConfig,
    Timing,
};
pub use config::{Config, ConfigError, StoreBackend};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use embedding::{Embedder, EmbeddingError, MemoizedEmbedder, OpenAiEmbedder, StubEmbedder};
#[cfg(any(test, feature = "mock"))]
pub use embedding::ScriptedEmbedder;
pub use generation::{
    GenaiGenerator, Generation, GenerationError, Generator, MockGenerator, PriceKind,
    calculate_cost, generation_cost,
};
pub use hashing::{hash_to_u64, normalize_query, query_fingerprint};
pub use similarity::{BestMatch, best_match, cosine_similarity};
pub use storage::{
    CacheEntry, CacheStore, InMemoryCacheStore, RedisCacheStore, RedisStoreConfig, StorageError,
};
