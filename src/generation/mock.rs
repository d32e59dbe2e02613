use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{Generation, GenerationError, Generator};
use crate::constants::DEFAULT_CHAT_MODEL;

/// Canned generator: answers `Mock response for: {prompt}` with 10 + 10 tokens.
///
/// Clones share the call counter.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    model: String,
    latency: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockGenerator {
    pub const PROMPT_TOKENS: u32 = 10;
    pub const COMPLETION_TOKENS: u32 = 10;

    pub fn new() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            latency: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sleeps before answering (widens race windows in tests).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<Generation, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        Ok(Generation {
            text: format!("Mock response for: {}", prompt),
            prompt_tokens: Self::PROMPT_TOKENS,
            completion_tokens: Self::COMPLETION_TOKENS,
            total_tokens: Self::PROMPT_TOKENS + Self::COMPLETION_TOKENS,
            model: self.model.clone(),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_mock(&self) -> bool {
        true
    }
}
