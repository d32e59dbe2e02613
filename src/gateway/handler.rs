use std::time::Instant;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::cache::semantic::elapsed_ms;
use crate::cache::{SEMCACHE_STATUS_CLEARED, SEMCACHE_STATUS_HEADER};
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{ClearResponse, QueryRequest, QueryResponse, StatsResponse};
use crate::gateway::state::HandlerState;

#[instrument(skip(state, payload), fields(cache_status = tracing::field::Empty))]
pub async fn query_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(body) =
        payload.map_err(|e| GatewayError::InvalidRequest(format!("Invalid JSON body: {}", e)))?;
    let request = parse_query_request(body)?;

    debug!(use_cache = request.use_cache, "Semantic cache query");

    let resolution = state
        .cache
        .resolve(&request.query, request.use_cache)
        .await?;

    let status = resolution.status;
    tracing::Span::current().record("cache_status", status.as_header_value());

    let mut headers = HeaderMap::new();
    headers.insert(
        SEMCACHE_STATUS_HEADER,
        HeaderValue::from_static(status.as_header_value()),
    );

    let body = QueryResponse::from_resolution(request.query, resolution);
    Ok((StatusCode::OK, headers, Json(body)).into_response())
}

#[instrument(skip(state))]
pub async fn clear_handler(State(state): State<HandlerState>) -> Result<Response, GatewayError> {
    let started = Instant::now();
    let outcome = state.cache.clear().await?;

    let body = ClearResponse {
        success: true,
        message: format!("Cleared {} cache entries", outcome.deleted_count),
        deleted_count: outcome.deleted_count,
        execution_time: elapsed_ms(started),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        SEMCACHE_STATUS_HEADER,
        HeaderValue::from_static(SEMCACHE_STATUS_CLEARED),
    );
    Ok((StatusCode::OK, headers, Json(body)).into_response())
}

#[instrument(skip(state))]
pub async fn stats_handler(State(state): State<HandlerState>) -> Result<Response, GatewayError> {
    let started = Instant::now();
    let stats = state.cache.stats().await?;

    let body = StatsResponse {
        success: true,
        stats: stats.into(),
        execution_time: elapsed_ms(started),
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub(crate) fn parse_query_request(body: serde_json::Value) -> Result<QueryRequest, GatewayError> {
    let has_query = body
        .get("query")
        .and_then(|q| q.as_str())
        .is_some_and(|q| !q.trim().is_empty());
    if !has_query {
        return Err(GatewayError::InvalidRequest("Query is required".to_string()));
    }

    serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}
