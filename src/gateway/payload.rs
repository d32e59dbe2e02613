//! JSON request and response bodies (camelCase on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, Resolution, Timing};
use crate::storage::CacheEntry;

fn default_use_cache() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimingPayload {
    pub embedding: f64,
    pub total: f64,
}

impl From<Timing> for TimingPayload {
    fn from(timing: Timing) -> Self {
        Self {
            embedding: timing.embedding_ms,
            total: timing.total_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub success: bool,
    pub query: String,
    pub response: String,
    pub cache_hit: bool,
    pub similarity: Option<f32>,
    pub cached_query: Option<String>,
    pub tokens: u32,
    pub cost: f64,
    pub model: String,
    pub timing: TimingPayload,
}

impl QueryResponse {
    pub fn from_resolution(query: String, resolution: Resolution) -> Self {
        Self {
            success: true,
            query,
            cache_hit: resolution.is_hit(),
            response: resolution.response,
            similarity: resolution.similarity,
            cached_query: resolution.matched_query,
            tokens: resolution.tokens,
            cost: resolution.cost,
            model: resolution.model,
            timing: resolution.timing.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: usize,
    pub execution_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentEntry {
    pub query: String,
    pub response: String,
    pub tokens: u32,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

impl From<CacheEntry> for RecentEntry {
    fn from(entry: CacheEntry) -> Self {
        Self {
            query: entry.query,
            response: entry.response,
            tokens: entry.tokens,
            model: entry.model,
            timestamp: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsBody {
    pub total_entries: usize,
    pub total_tokens_saved: u64,
    pub recent_entries: Vec<RecentEntry>,
}

impl From<CacheStats> for StatsBody {
    fn from(stats: CacheStats) -> Self {
        Self {
            total_entries: stats.total_entries,
            total_tokens_saved: stats.total_tokens_saved,
            recent_entries: stats.recent_entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsBody,
    pub execution_time: f64,
}
