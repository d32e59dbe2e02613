use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cache::{CacheError, SEMCACHE_STATUS_HEADER};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{reason}")]
    UpstreamUnavailable { reason: String, configuration: bool },

    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<CacheError> for GatewayError {
    fn from(err: CacheError) -> Self {
        let configuration = err.is_configuration_error();
        match err {
            CacheError::InvalidInput(reason) => GatewayError::InvalidRequest(reason),
            e @ CacheError::UpstreamUnavailable { .. } => GatewayError::UpstreamUnavailable {
                reason: e.to_string(),
                configuration,
            },
            CacheError::Store(e) => GatewayError::StorageError(e.to_string()),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: u16,
    pub config_error: bool,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, semcache_status, config_error) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request", false),
            GatewayError::UpstreamUnavailable {
                configuration: true,
                ..
            } => (StatusCode::SERVICE_UNAVAILABLE, "config_error", true),
            GatewayError::UpstreamUnavailable { .. } => {
                (StatusCode::BAD_GATEWAY, "upstream_error", false)
            }
            GatewayError::StorageError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", false)
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            SEMCACHE_STATUS_HEADER,
            HeaderValue::from_static(semcache_status),
        );

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
            code: status.as_u16(),
            config_error,
        });

        (status, headers, body).into_response()
    }
}
