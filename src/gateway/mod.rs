//! HTTP gateway (Axum) in front of the semantic cache.
//!
//! This module is primarily used by the `semcache` server binary.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{clear_handler, query_handler, stats_handler};
pub use state::HandlerState;

use crate::cache::{
    SEMCACHE_STATUS_ERROR, SEMCACHE_STATUS_HEADER, SEMCACHE_STATUS_HEALTHY,
    SEMCACHE_STATUS_NOT_READY, SEMCACHE_STATUS_READY,
};

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/query", post(query_handler))
        .route("/clear", post(clear_handler))
        .route("/stats", post(stats_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub store: &'static str,
    pub embedder_mode: &'static str,
    pub generator_mode: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        SEMCACHE_STATUS_HEADER,
        HeaderValue::from_static(SEMCACHE_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let store_status = match state.cache.store().ping().await {
        Ok(()) => SEMCACHE_STATUS_READY,
        Err(e) => {
            tracing::warn!(error = %e, "Store ping failed");
            SEMCACHE_STATUS_ERROR
        }
    };

    let embedder_mode = if state.cache.is_embedder_stub() {
        "stub"
    } else {
        "real"
    };
    let generator_mode = if state.mock_provider { "mock" } else { "real" };

    let components = ComponentStatus {
        http: SEMCACHE_STATUS_READY,
        store: store_status,
        embedder_mode,
        generator_mode,
    };

    let is_ready = components.store == SEMCACHE_STATUS_READY;

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    let mut headers = HeaderMap::new();
    headers.insert(
        SEMCACHE_STATUS_HEADER,
        HeaderValue::from_static(if is_ready {
            SEMCACHE_STATUS_READY
        } else {
            SEMCACHE_STATUS_NOT_READY
        }),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
