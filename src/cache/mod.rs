//! Semantic cache: embedding lookup, miss generation and storage, clear, stats.

pub mod config;
pub mod error;
pub mod reaper;
pub mod semantic;
pub mod singleflight;
pub mod types;


pub use config::SemanticCacheConfig;
pub use error::{CacheError, CacheResult, Upstream};
pub use reaper::{ExpiryReaper, REAPER_INTERVAL_SECS};
pub use semantic::{CacheStats, ClearOutcome, Resolution, SemanticCache, Timing};
pub use singleflight::{FlightGuard, SingleFlight};
pub use types::{
    CacheStatus, SEMCACHE_STATUS_CLEARED, SEMCACHE_STATUS_ERROR, SEMCACHE_STATUS_HEADER,
    SEMCACHE_STATUS_HEALTHY, SEMCACHE_STATUS_NOT_READY, SEMCACHE_STATUS_READY,
};
