use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// No credential (or a rejected one) for the embedding service.
    #[error("embedding service not configured: {reason}")]
    NotConfigured { reason: String },

    #[error("embedding service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("invalid embedding response: {reason}")]
    InvalidResponse { reason: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbeddingError {
    /// Returns `true` for errors an operator fixes in configuration rather than by retrying.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            EmbeddingError::NotConfigured { .. } | EmbeddingError::DimensionMismatch { .. }
        )
    }
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EmbeddingError::InvalidResponse {
                reason: err.to_string(),
            }
        } else {
            EmbeddingError::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}
