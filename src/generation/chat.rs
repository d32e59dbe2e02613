use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use genai::resolver::{AuthData, Endpoint};
use genai::{Client, ServiceTarget};
use tracing::{debug, error, instrument, warn};

use super::{Generation, GenerationError, Generator};
use crate::constants::{DEFAULT_CHAT_MODEL, DEFAULT_MAX_COMPLETION_TOKENS, DEFAULT_OPENAI_BASE_URL};

/// Chat generator backed by a [`genai::Client`].
///
/// OpenAI-routed models are sent to `{base_url}/v1/` with the configured key; a generator
/// without a key fails with a configuration error before any request is made.
#[derive(Clone)]
pub struct GenaiGenerator {
    client: Client,
    model: String,
    max_tokens: u32,
    api_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for GenaiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiGenerator")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl GenaiGenerator {
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        let base_url = DEFAULT_OPENAI_BASE_URL.to_string();
        Self {
            client: build_client(&base_url, api_key.clone()),
            model: model.into(),
            max_tokens: DEFAULT_MAX_COMPLETION_TOKENS,
            api_key,
            base_url,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self.client = build_client(&self.base_url, self.api_key.clone());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for GenaiGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_MODEL, None)
    }
}

fn openai_endpoint(base_url: &str) -> Endpoint {
    Endpoint::from_owned(format!("{}/v1/", base_url.trim_end_matches('/')))
}

/// Points OpenAI-routed targets at `endpoint`, authenticated with `api_key` when given.
/// Other adapters keep genai's defaults.
fn route_openai(
    mut target: ServiceTarget,
    endpoint: &Endpoint,
    api_key: Option<&str>,
) -> ServiceTarget {
    if target.model.adapter_kind == AdapterKind::OpenAI {
        target.endpoint = endpoint.clone();
        if let Some(key) = api_key {
            target.auth = AuthData::from_single(key);
        }
    }
    target
}

fn build_client(base_url: &str, api_key: Option<String>) -> Client {
    let endpoint = openai_endpoint(base_url);
    Client::builder()
        .with_service_target_resolver_fn(
            move |target: ServiceTarget| -> genai::resolver::Result<ServiceTarget> {
                Ok(route_openai(target, &endpoint, api_key.as_deref()))
            },
        )
        .build()
}

/// The provider's model id (often a dated snapshot), or the requested name when absent.
fn reported_model(provider_model: &str, requested: &str) -> String {
    if provider_model.trim().is_empty() {
        requested.to_string()
    } else {
        provider_model.to_string()
    }
}

fn token_count(value: Option<i32>) -> u32 {
    value.unwrap_or(0).max(0) as u32
}

#[async_trait]
impl Generator for GenaiGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<Generation, GenerationError> {
        if !self.is_configured() {
            return Err(GenerationError::NotConfigured {
                reason: "OPENAI_API_KEY environment variable is not set".to_string(),
            });
        }

        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let options = ChatOptions::default().with_max_tokens(self.max_tokens);

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&options))
            .await
            .map_err(|e| {
                error!(error = %e, "Provider error");
                GenerationError::Unavailable {
                    reason: e.to_string(),
                }
            })?;

        let text = response.first_text().unwrap_or_default().to_string();
        if text.is_empty() {
            warn!("Provider returned an empty completion");
        }

        let prompt_tokens = token_count(response.usage.prompt_tokens);
        let completion_tokens = token_count(response.usage.completion_tokens);
        let total_tokens = response
            .usage
            .total_tokens
            .map(|t| t.max(0) as u32)
            .unwrap_or(prompt_tokens + completion_tokens);

        debug!(
            prompt_tokens,
            completion_tokens, total_tokens, "Completion received"
        );

        Ok(Generation {
            text,
            prompt_tokens,
            completion_tokens,
            total_tokens,
            model: reported_model(&response.provider_model_iden.model_name, &self.model),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
