use std::time::Duration;

use crate::constants::{DEFAULT_RECENT_ENTRIES, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TTL_SECS};

/// Tuning for [`SemanticCache`](super::SemanticCache).
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticCacheConfig {
    /// Minimum cosine similarity for a hit (inclusive).
    pub threshold: f32,
    /// How long a stored entry stays visible.
    pub retention: Duration,
    /// How many entries `stats` reports.
    pub recent_entries: usize,
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            retention: Duration::from_secs(DEFAULT_TTL_SECS),
            recent_entries: DEFAULT_RECENT_ENTRIES,
        }
    }
}

impl SemanticCacheConfig {
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn recent_entries(mut self, n: usize) -> Self {
        self.recent_entries = n;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(format!(
                "threshold must be in (0, 1], got {}",
                self.threshold
            ));
        }
        if self.retention.is_zero() {
            return Err("retention must be greater than zero".to_string());
        }
        Ok(())
    }

    pub(crate) fn retention_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.retention).unwrap_or(chrono::Duration::MAX)
    }
}
