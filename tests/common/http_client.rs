//! HTTP client helpers for tests.

use semcache::gateway::payload::{ClearResponse, QueryResponse, StatsResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    /// Returns the response body and the `X-Semcache-Status` header.
    pub async fn query(
        &self,
        query: &str,
        use_cache: bool,
    ) -> Result<(QueryResponse, String), TestClientError> {
        let body = json!({ "query": query, "useCache": use_cache });
        self.query_raw(body).await
    }

    pub async fn query_raw(
        &self,
        body: serde_json::Value,
    ) -> Result<(QueryResponse, String), TestClientError> {
        let resp = self.client.post(self.url("/query")).json(&body).send().await?;

        let status_header = resp
            .headers()
            .get("x-semcache-status")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        match resp.status().as_u16() {
            200 => Ok((resp.json().await?, status_header)),
            400 | 422 => Err(TestClientError::BadRequest(resp.text().await?)),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(TestClientError::UnexpectedStatus(status, body))
            }
        }
    }

    pub async fn clear(&self) -> Result<ClearResponse, TestClientError> {
        let resp = self.client.post(self.url("/clear")).send().await?;
        Self::json_or_status(resp).await
    }

    pub async fn stats(&self) -> Result<StatsResponse, TestClientError> {
        let resp = self.client.post(self.url("/stats")).send().await?;
        Self::json_or_status(resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        let resp = self.client.get(self.url("/healthz")).send().await?;
        Self::json_or_status(resp).await
    }

    pub async fn ready(&self) -> Result<ReadyResponse, TestClientError> {
        let resp = self.client.get(self.url("/ready")).send().await?;
        Self::json_or_status(resp).await
    }

    async fn json_or_status<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, TestClientError> {
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComponentStatus {
    pub http: String,
    pub store: String,
    pub embedder_mode: String,
    pub generator_mode: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

impl ReadyResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0} - Body: {1}")]
    UnexpectedStatus(u16, String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_url_building() {
        let client = TestClient::new("http://localhost:8080");
        assert_eq!(client.url("/healthz"), "http://localhost:8080/healthz");
        assert_eq!(client.url("query"), "http://localhost:8080/query");
    }

    #[test]
    fn test_ready_response_is_ok_helper() {
        let ready = ReadyResponse {
            status: "ok".to_string(),
            components: ComponentStatus {
                http: "ready".to_string(),
                store: "ready".to_string(),
                embedder_mode: "stub".to_string(),
                generator_mode: "mock".to_string(),
            },
        };
        assert!(ready.is_ok());
    }
}
