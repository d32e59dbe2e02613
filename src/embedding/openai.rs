use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{Embedder, EmbeddingError};
use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL};

/// Embedder backed by `POST {base_url}/v1/embeddings`.
///
/// The credential is checked per call, so a server started without `OPENAI_API_KEY`
/// still serves `/stats` and `/clear` and reports a configuration error on `/query`.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    dimension: usize,
}

impl std::fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl OpenAiEmbedder {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension: DEFAULT_EMBEDDING_DIM,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// `dimensions` to request, omitted when the model already returns `self.dimension`.
    fn requested_dimensions(&self) -> Option<usize> {
        let native = native_dimension(&self.model).unwrap_or(DEFAULT_EMBEDDING_DIM);
        (native != self.dimension).then_some(self.dimension)
    }

    fn request_body<'a>(&'a self, text: &'a str) -> EmbeddingRequestBody<'a> {
        EmbeddingRequestBody {
            model: &self.model,
            input: text,
            encoding_format: "float",
            dimensions: self.requested_dimensions(),
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EmbeddingError::NotConfigured {
                reason: "OPENAI_API_KEY environment variable is not set".to_string(),
            })?;

        let body = self.request_body(text);

        let response = self
            .client
            .post(self.embeddings_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(%status, "Embedding request rejected");
            return Err(status_error(status, detail));
        }

        let parsed: EmbeddingResponseBody = response.json().await?;
        debug!(
            prompt_tokens = parsed.usage.as_ref().map(|u| u.prompt_tokens),
            "Embedding received"
        );

        parsed
            .into_first_embedding()
            .ok_or_else(|| EmbeddingError::InvalidResponse {
                reason: "response contained no embeddings".to_string(),
            })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn status_error(status: StatusCode, detail: String) -> EmbeddingError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => EmbeddingError::NotConfigured {
            reason: format!("credential rejected ({}): {}", status, detail),
        },
        _ => EmbeddingError::Unavailable {
            reason: format!("HTTP {}: {}", status, detail),
        },
    }
}

fn native_dimension(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequestBody<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponseBody {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

impl EmbeddingResponseBody {
    fn into_first_embedding(self) -> Option<Vec<f32>> {
        self.data
            .into_iter()
            .min_by_key(|d| d.index)
            .map(|d| d.embedding)
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    prompt_tokens: u32,
}
