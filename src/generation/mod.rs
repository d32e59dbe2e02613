//! Text generation (the upstream chat model).

/// genai-backed chat generator.
pub mod chat;
mod error;
/// Deterministic generator for mock-provider mode and tests.
pub mod mock;
/// Static per-model prices.
pub mod pricing;

pub use chat::GenaiGenerator;
pub use error::GenerationError;
pub use mock::MockGenerator;
pub use pricing::{PriceKind, calculate_cost, generation_cost};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One completed generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    /// Model that produced `text`.
    pub model: String,
}

/// Answers a prompt with generated text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation, GenerationError>;

    /// Model requests are sent to (used for logging/readiness).
    fn model(&self) -> &str;

    /// `true` for the canned mock generator.
    fn is_mock(&self) -> bool {
        false
    }
}
