use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use super::config::SemanticCacheConfig;
use super::error::{CacheError, CacheResult};
use super::singleflight::SingleFlight;
use super::types::CacheStatus;
use crate::constants::validate_embedding_dim;
use crate::embedding::{Embedder, EmbeddingError};
use crate::generation::{Generator, generation_cost};
use crate::hashing::{query_fingerprint, short_hex};
use crate::similarity::best_match;
use crate::storage::{CacheEntry, CacheStore};

/// Milliseconds spent answering a query.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timing {
    pub embedding_ms: f64,
    pub total_ms: f64,
}

/// Outcome of [`SemanticCache::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub response: String,
    pub status: CacheStatus,
    /// Similarity of the matched entry (hits only).
    pub similarity: Option<f32>,
    /// Query text of the matched entry (hits only).
    pub matched_query: Option<String>,
    pub model: String,
    /// Tokens spent on this call; `0` on a hit.
    pub tokens: u32,
    /// USD spent on this call; `0.0` on a hit.
    pub cost: f64,
    pub timing: Timing,
}

impl Resolution {
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.status.is_hit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    pub deleted_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Live entries.
    pub total_entries: usize,
    /// Sum of `tokens` over `recent_entries`.
    pub total_tokens_saved: u64,
    /// Most recent live entries, newest first.
    pub recent_entries: Vec<CacheEntry>,
}

struct Hit {
    entry: CacheEntry,
    similarity: f32,
}

/// Embedding-similarity cache in front of a [`Generator`].
///
/// Cheap to share behind an `Arc`; every dependency is injected.
pub struct SemanticCache {
    store: Arc<dyn CacheStore>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    config: SemanticCacheConfig,
    flights: SingleFlight,
}

impl std::fmt::Debug for SemanticCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticCache")
            .field("config", &self.config)
            .field("embedder_dim", &self.embedder.dimension())
            .field("generator_model", &self.generator.model())
            .finish()
    }
}

impl SemanticCache {
    pub fn new(
        store: Arc<dyn CacheStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        config: SemanticCacheConfig,
    ) -> CacheResult<Self> {
        config.validate().map_err(CacheError::InvalidInput)?;

        Ok(Self {
            store,
            embedder,
            generator,
            config,
            flights: SingleFlight::new(),
        })
    }

    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    pub fn is_embedder_stub(&self) -> bool {
        self.embedder.is_stub()
    }

    /// Answers `query` from the cache when a similar enough entry exists, otherwise
    /// generates, stores and returns a fresh answer.
    ///
    /// With `use_cache = false` the lookup is skipped but the fresh answer is still stored.
    #[instrument(
        skip(self, query),
        fields(query_len = query.len(), status = tracing::field::Empty)
    )]
    pub async fn resolve(&self, query: &str, use_cache: bool) -> CacheResult<Resolution> {
        let started = Instant::now();

        if query.trim().is_empty() {
            return Err(CacheError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }

        let embed_started = Instant::now();
        let embedding = self.embed(query).await?;
        let embedding_ms = elapsed_ms(embed_started);

        if use_cache && let Some(hit) = self.lookup(&embedding).await? {
            return Ok(self.hit_resolution(hit, embedding_ms, started));
        }

        let fingerprint = query_fingerprint(query);
        let flight = self.flights.acquire(fingerprint).await;

        // A peer may have stored an answer between the first lookup and acquiring the flight.
        if use_cache {
            debug!(
                fingerprint = %short_hex(&fingerprint),
                waited = flight.waited(),
                "Re-checking cache under flight"
            );
            if let Some(hit) = self.lookup(&embedding).await? {
                return Ok(self.hit_resolution(hit, embedding_ms, started));
            }
        }

        debug!("Cache miss, calling generator");
        let generation = self.generator.generate(query).await?;
        let cost = generation_cost(&generation);

        let entry = CacheEntry::new(
            query,
            generation.text.clone(),
            embedding,
            generation.model.clone(),
            generation.total_tokens,
            Utc::now(),
            self.config.retention_chrono(),
        );
        self.store.insert(&entry).await?;
        drop(flight);

        tracing::Span::current().record("status", CacheStatus::Miss.as_header_value());
        info!(
            id = %entry.id,
            tokens = generation.total_tokens,
            cost,
            "Stored new cache entry"
        );

        Ok(Resolution {
            response: generation.text,
            status: CacheStatus::Miss,
            similarity: None,
            matched_query: None,
            model: generation.model,
            tokens: generation.total_tokens,
            cost,
            timing: Timing {
                embedding_ms,
                total_ms: elapsed_ms(started),
            },
        })
    }

    /// Deletes every entry, expired or not.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> CacheResult<ClearOutcome> {
        let deleted_count = self.store.clear().await?;
        info!(deleted_count, "Cache cleared");
        Ok(ClearOutcome { deleted_count })
    }

    /// Live entry count plus the most recent entries and their token total.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> CacheResult<CacheStats> {
        let now = Utc::now();
        let total_entries = self.store.count(now).await?;
        let recent_entries = self.store.recent(now, self.config.recent_entries).await?;
        let total_tokens_saved = recent_entries.iter().map(|e| u64::from(e.tokens)).sum();

        Ok(CacheStats {
            total_entries,
            total_tokens_saved,
            recent_entries,
        })
    }

    /// Physically removes expired entries.
    pub async fn purge_expired(&self) -> CacheResult<usize> {
        Ok(self.store.purge_expired(Utc::now()).await?)
    }

    async fn embed(&self, text: &str) -> CacheResult<Vec<f32>> {
        let embedding = self.embedder.embed(text).await?;

        validate_embedding_dim(embedding.len(), self.embedder.dimension()).map_err(|_| {
            EmbeddingError::DimensionMismatch {
                expected: self.embedder.dimension(),
                actual: embedding.len(),
            }
        })?;

        Ok(embedding)
    }

    async fn lookup(&self, embedding: &[f32]) -> CacheResult<Option<Hit>> {
        let mut entries = self.store.scan(Utc::now()).await?;

        let best = best_match(
            embedding,
            entries.iter().map(|e| e.embedding.as_slice()),
            self.config.threshold,
        );

        match best {
            Some(m) => {
                debug!(
                    similarity = m.similarity,
                    scanned = entries.len(),
                    "Semantic cache hit"
                );
                Ok(Some(Hit {
                    entry: entries.swap_remove(m.index),
                    similarity: m.similarity,
                }))
            }
            None => {
                if entries.is_empty() {
                    debug!("Cache is empty");
                } else {
                    debug!(scanned = entries.len(), "No entry above threshold");
                }
                Ok(None)
            }
        }
    }

    fn hit_resolution(&self, hit: Hit, embedding_ms: f64, started: Instant) -> Resolution {
        tracing::Span::current().record("status", CacheStatus::Hit.as_header_value());
        if hit.entry.response.is_empty() {
            warn!(id = %hit.entry.id, "Serving cached entry with empty response");
        }

        Resolution {
            response: hit.entry.response,
            status: CacheStatus::Hit,
            similarity: Some(hit.similarity),
            matched_query: Some(hit.entry.query),
            model: hit.entry.model,
            tokens: 0,
            cost: 0.0,
            timing: Timing {
                embedding_ms,
                total_ms: elapsed_ms(started),
            },
        }
    }
}

#[inline]
pub(crate) fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
