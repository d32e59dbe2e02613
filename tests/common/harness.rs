//! Test server harness.

use semcache::cache::{SemanticCache, SemanticCacheConfig};
use semcache::embedding::{Embedder, MemoizedEmbedder, StubEmbedder};
use semcache::gateway::{HandlerState, create_router_with_state};
use semcache::generation::MockGenerator;
use semcache::storage::{CacheStore, InMemoryCacheStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub threshold: f32,
    pub retention: Duration,
    pub recent_entries: usize,
    pub embedding_dim: usize,
    /// Added to every generation call.
    pub generator_latency: Option<Duration>,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            retention: Duration::from_secs(3600),
            recent_entries: 10,
            embedding_dim: 1536,
            generator_latency: None,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: InMemoryCacheStore,
    pub generator: MockGenerator,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server with every external dependency replaced:
/// in-memory store, stub embedder and mock generator.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let store = InMemoryCacheStore::new();
    let embedder: Arc<dyn Embedder> = Arc::new(MemoizedEmbedder::new(
        StubEmbedder::with_dimension(config.embedding_dim),
    ));
    let generator = match config.generator_latency {
        Some(latency) => MockGenerator::new().with_latency(latency),
        None => MockGenerator::new(),
    };

    let cache_config = SemanticCacheConfig::default()
        .threshold(config.threshold)
        .retention(config.retention)
        .recent_entries(config.recent_entries);

    let store_handle: Arc<dyn CacheStore> = Arc::new(store.clone());
    let cache = SemanticCache::new(
        store_handle,
        embedder,
        Arc::new(generator.clone()),
        cache_config,
    )
    .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let app = create_router_with_state(HandlerState::new(Arc::new(cache)));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        store,
        generator,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
