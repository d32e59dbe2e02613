//! Storage model types.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::StorageError;

/// A cached answer. Immutable once created.
///
/// # Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use semcache::CacheEntry;
///
/// let now = Utc::now();
/// let entry = CacheEntry::new("What is Redis?", "An in-memory store.", vec![1.0, 0.0],
///     "gpt-4o-mini", 42, now, Duration::hours(1));
/// assert!(entry.is_live(now));
/// assert!(!entry.is_live(now + Duration::hours(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Time-ordered identifier (UUID v7).
    pub id: String,
    /// Original request text.
    pub query: String,
    /// Answer returned by the generation service.
    pub response: String,
    /// Embedding of `query`.
    pub embedding: Vec<f32>,
    /// Model that produced `response`.
    pub model: String,
    /// Tokens spent producing `response`.
    pub tokens: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub const FIELD_QUERY: &'static str = "query";
    pub const FIELD_RESPONSE: &'static str = "response";
    pub const FIELD_EMBEDDING: &'static str = "embedding";
    pub const FIELD_MODEL: &'static str = "model";
    pub const FIELD_TOKENS: &'static str = "tokens";
    pub const FIELD_CREATED_AT: &'static str = "created_at";
    pub const FIELD_EXPIRES_AT: &'static str = "expires_at";

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        query: impl Into<String>,
        response: impl Into<String>,
        embedding: Vec<f32>,
        model: impl Into<String>,
        tokens: u32,
        created_at: DateTime<Utc>,
        retention: Duration,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            query: query.into(),
            response: response.into(),
            embedding,
            model: model.into(),
            tokens,
            created_at,
            expires_at: created_at + retention,
        }
    }

    /// Visible to lookups only while `now < expires_at`.
    #[inline]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Remaining lifetime at `now` (zero once expired).
    pub fn ttl_at(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.expires_at - now).to_std().unwrap_or_default()
    }

    /// Creation time in microseconds since the epoch (ordering score).
    pub fn created_at_micros(&self) -> i64 {
        self.created_at.timestamp_micros()
    }

    /// Flattens the entry into string fields (Redis hash layout; the id lives in the key).
    pub fn to_fields(&self) -> Result<Vec<(&'static str, String)>, StorageError> {
        let embedding =
            serde_json::to_string(&self.embedding).map_err(|e| StorageError::Corrupt {
                key: self.id.clone(),
                reason: format!("failed to encode embedding: {}", e),
            })?;

        Ok(vec![
            (Self::FIELD_QUERY, self.query.clone()),
            (Self::FIELD_RESPONSE, self.response.clone()),
            (Self::FIELD_EMBEDDING, embedding),
            (Self::FIELD_MODEL, self.model.clone()),
            (Self::FIELD_TOKENS, self.tokens.to_string()),
            (Self::FIELD_CREATED_AT, self.created_at.to_rfc3339()),
            (Self::FIELD_EXPIRES_AT, self.expires_at.to_rfc3339()),
        ])
    }

    /// Rebuilds an entry from its hash fields.
    pub fn from_fields(id: &str, fields: &HashMap<String, String>) -> Result<Self, StorageError> {
        let corrupt = |reason: String| StorageError::Corrupt {
            key: id.to_string(),
            reason,
        };
        let field = |name: &str| {
            fields
                .get(name)
                .ok_or_else(|| corrupt(format!("missing field '{}'", name)))
        };
        let timestamp = |name: &str| -> Result<DateTime<Utc>, StorageError> {
            DateTime::parse_from_rfc3339(field(name)?)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| corrupt(format!("invalid '{}': {}", name, e)))
        };

        let embedding: Vec<f32> = serde_json::from_str(field(Self::FIELD_EMBEDDING)?)
            .map_err(|e| corrupt(format!("invalid embedding: {}", e)))?;

        Ok(Self {
            id: id.to_string(),
            query: field(Self::FIELD_QUERY)?.clone(),
            response: fields
                .get(Self::FIELD_RESPONSE)
                .cloned()
                .unwrap_or_default(),
            embedding,
            model: fields.get(Self::FIELD_MODEL).cloned().unwrap_or_default(),
            tokens: fields
                .get(Self::FIELD_TOKENS)
                .and_then(|t| t.parse().ok())
                .unwrap_or(0),
            created_at: timestamp(Self::FIELD_CREATED_AT)?,
            expires_at: timestamp(Self::FIELD_EXPIRES_AT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> CacheEntry {
        CacheEntry::new(
            "What is Redis?",
            "An in-memory data structure store.",
            vec![0.25, -0.5, 1.0],
            "gpt-4o-mini",
            57,
            Utc::now(),
            Duration::seconds(3600),
        )
    }

    fn as_map(fields: Vec<(&'static str, String)>) -> HashMap<String, String> {
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_expiry_boundary() {
        let entry = create_test_entry();

        assert!(entry.is_live(entry.created_at));
        assert!(entry.is_live(entry.expires_at - Duration::milliseconds(1)));
        assert!(!entry.is_live(entry.expires_at));
        assert_eq!(entry.expires_at - entry.created_at, Duration::seconds(3600));
    }

    #[test]
    fn test_ttl_at() {
        let entry = create_test_entry();

        assert_eq!(
            entry.ttl_at(entry.created_at),
            std::time::Duration::from_secs(3600)
        );
        assert_eq!(
            entry.ttl_at(entry.expires_at + Duration::seconds(5)),
            std::time::Duration::ZERO
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let first = create_test_entry();
        let second = create_test_entry();

        assert_ne!(first.id, second.id);
        assert_eq!(Uuid::parse_str(&first.id).unwrap().get_version_num(), 7);
    }

    #[test]
    fn test_fields_round_trip() {
        let entry = create_test_entry();
        let fields = as_map(entry.to_fields().unwrap());

        let restored = CacheEntry::from_fields(&entry.id, &fields).unwrap();

        assert_eq!(restored.query, entry.query);
        assert_eq!(restored.response, entry.response);
        assert_eq!(restored.embedding, entry.embedding);
        assert_eq!(restored.tokens, 57);
        assert_eq!(
            restored.created_at.timestamp_micros(),
            entry.created_at.timestamp_micros()
        );
    }

    #[test]
    fn test_from_fields_missing_embedding_is_corrupt() {
        let entry = create_test_entry();
        let mut fields = as_map(entry.to_fields().unwrap());
        fields.remove(CacheEntry::FIELD_EMBEDDING);

        let err = CacheEntry::from_fields("abc", &fields).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { ref key, .. } if key == "abc"));
    }

    #[test]
    fn test_from_fields_defaults_optional_fields() {
        let entry = create_test_entry();
        let mut fields = as_map(entry.to_fields().unwrap());
        fields.remove(CacheEntry::FIELD_MODEL);
        fields.insert(CacheEntry::FIELD_TOKENS.to_string(), "not-a-number".to_string());

        let restored = CacheEntry::from_fields(&entry.id, &fields).unwrap();
        assert_eq!(restored.model, "");
        assert_eq!(restored.tokens, 0);
    }
}
