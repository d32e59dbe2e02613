//! End-to-end HTTP tests.

mod common;

use std::time::Duration;

use semcache::cache::SEMCACHE_STATUS_READY;
use semcache::generation::MockGenerator;
use serde_json::json;

use common::harness::{TestServerConfig, spawn_test_server};
use common::http_client::{TestClient, TestClientError};

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");

    let client = TestClient::new(server.url());
    let health = client.health().await.expect("Health check should succeed");

    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_ready_endpoint_indicates_dependencies() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");

    let client = TestClient::new(server.url());
    let ready = client.ready().await.expect("Ready check should succeed");

    assert!(ready.is_ok(), "Server should report ready");
    assert_eq!(ready.components.http, SEMCACHE_STATUS_READY);
    assert_eq!(ready.components.store, SEMCACHE_STATUS_READY);
    assert_eq!(ready.components.embedder_mode, "stub");
    assert_eq!(ready.components.generator_mode, "mock");
}

#[tokio::test]
async fn test_query_miss_then_rephrased_hit() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    let (first, status) = client
        .query("What is Redis?", true)
        .await
        .expect("First query should succeed");
    assert_eq!(status, "MISS");
    assert!(first.success);
    assert!(!first.cache_hit);
    assert_eq!(first.response, "Mock response for: What is Redis?");
    assert_eq!(
        first.tokens,
        MockGenerator::PROMPT_TOKENS + MockGenerator::COMPLETION_TOKENS
    );
    assert!(first.similarity.is_none());
    assert!(first.cached_query.is_none());

    let (second, status) = client
        .query("what is redis", true)
        .await
        .expect("Second query should succeed");
    assert_eq!(status, "HIT");
    assert!(second.cache_hit);
    assert_eq!(second.query, "what is redis");
    assert_eq!(second.response, first.response);
    assert_eq!(second.cached_query.as_deref(), Some("What is Redis?"));
    assert_eq!(second.tokens, 0);
    assert_eq!(second.cost, 0.0);
    let similarity = second.similarity.expect("hit should carry similarity");
    assert!(similarity > 0.99, "similarity was {}", similarity);

    assert_eq!(server.generator.calls(), 1);
    assert_eq!(server.store.len(), 1);
}

#[tokio::test]
async fn test_unrelated_query_misses() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    client.query("What is Redis?", true).await.unwrap();
    let (resp, status) = client.query("How do I bake bread?", true).await.unwrap();

    assert_eq!(status, "MISS");
    assert!(!resp.cache_hit);
    assert_eq!(server.generator.calls(), 2);
    assert_eq!(server.store.len(), 2);
}

#[tokio::test]
async fn test_use_cache_false_forces_generation() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    client.query("What is Redis?", true).await.unwrap();
    let (resp, status) = client.query("What is Redis?", false).await.unwrap();

    assert_eq!(status, "MISS");
    assert!(!resp.cache_hit);
    assert_eq!(server.generator.calls(), 2);
}

#[tokio::test]
async fn test_missing_use_cache_defaults_to_true() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    client.query("What is Redis?", true).await.unwrap();
    let (resp, status) = client
        .query_raw(json!({ "query": "What is Redis?" }))
        .await
        .unwrap();

    assert_eq!(status, "HIT");
    assert!(resp.cache_hit);
}

#[tokio::test]
async fn test_blank_query_is_rejected() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    let err = client.query("   ", true).await.unwrap_err();
    match err {
        TestClientError::BadRequest(body) => assert!(body.contains("Query is required")),
        other => panic!("expected bad request, got {other:?}"),
    }
    assert_eq!(server.generator.calls(), 0);
}

#[tokio::test]
async fn test_clear_then_stats() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    client.query("What is Redis?", true).await.unwrap();
    client.query("How do I bake bread?", true).await.unwrap();

    let stats = client.stats().await.unwrap();
    assert!(stats.success);
    assert_eq!(stats.stats.total_entries, 2);
    assert_eq!(stats.stats.total_tokens_saved, 40);
    assert_eq!(stats.stats.recent_entries.len(), 2);
    assert_eq!(stats.stats.recent_entries[0].query, "How do I bake bread?");

    let cleared = client.clear().await.unwrap();
    assert!(cleared.success);
    assert_eq!(cleared.deleted_count, 2);
    assert_eq!(cleared.message, "Cleared 2 cache entries");

    let again = client.clear().await.unwrap();
    assert_eq!(again.deleted_count, 0);

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.stats.total_entries, 0);
    assert_eq!(stats.stats.total_tokens_saved, 0);
    assert!(stats.stats.recent_entries.is_empty());

    let (_, status) = client.query("What is Redis?", true).await.unwrap();
    assert_eq!(status, "MISS");
}

#[tokio::test]
async fn test_expired_entries_are_not_served() {
    let server = spawn_test_server(TestServerConfig {
        retention: Duration::from_millis(200),
        ..Default::default()
    })
    .await
    .expect("Server should start");
    let client = TestClient::new(server.url());

    client.query("What is Redis?", true).await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    let (_, status) = client.query("What is Redis?", true).await.unwrap();
    assert_eq!(status, "MISS");
    assert_eq!(server.generator.calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_queries_generate_once() {
    let server = spawn_test_server(TestServerConfig {
        generator_latency: Some(Duration::from_millis(100)),
        ..Default::default()
    })
    .await
    .expect("Server should start");

    let url = server.url();
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let client = TestClient::new(url.clone());
        tasks.push(async move { client.query("What is Redis?", true).await });
    }

    let results = futures::future::join_all(tasks).await;
    let mut misses = 0;
    for result in results {
        let (resp, status) = result.expect("Concurrent request should succeed");
        assert_eq!(resp.response, "Mock response for: What is Redis?");
        if status == "MISS" {
            misses += 1;
        }
    }

    assert_eq!(misses, 1);
    assert_eq!(server.generator.calls(), 1);
    assert_eq!(server.store.len(), 1);
}

#[tokio::test]
async fn test_server_shutdown_is_clean() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());
    client.health().await.unwrap();

    server.shutdown().await;
}
