use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation service not configured: {reason}")]
    NotConfigured { reason: String },

    #[error("generation service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("invalid generation response: {reason}")]
    InvalidResponse { reason: String },
}

impl GenerationError {
    /// Returns `true` for errors an operator fixes in configuration rather than by retrying.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, GenerationError::NotConfigured { .. })
    }
}
