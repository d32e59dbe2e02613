//! Semcache HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use semcache::cache::{ExpiryReaper, SemanticCache};
use semcache::config::{Config, StoreBackend};
use semcache::embedding::{Embedder, MemoizedEmbedder, OpenAiEmbedder, StubEmbedder};
use semcache::gateway::{HandlerState, create_router_with_state};
use semcache::generation::{GenaiGenerator, Generator, MockGenerator};
use semcache::storage::{CacheStore, InMemoryCacheStore, RedisCacheStore, RedisStoreConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        store = %config.store,
        threshold = config.similarity_threshold,
        ttl_secs = config.ttl_secs,
        "Semcache starting"
    );

    let store = build_store(&config).await?;
    let embedder = build_embedder(&config);
    let generator = build_generator(&config);

    let cache = Arc::new(SemanticCache::new(
        store,
        embedder,
        generator,
        config.cache_config(),
    )?);

    let reaper = ExpiryReaper::new(Arc::clone(&cache));
    let reaper_handle = reaper.start();

    let app = create_router_with_state(HandlerState::new(cache));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.stop();
    if let Err(e) = reaper_handle.await {
        tracing::warn!(error = %e, "Expiry reaper did not stop cleanly");
    }

    tracing::info!("Semcache shutdown complete");
    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn CacheStore>> {
    match config.store {
        StoreBackend::Redis => {
            let store =
                RedisCacheStore::connect(RedisStoreConfig::new(config.redis_url.clone())).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; entries are lost on restart");
            Ok(Arc::new(InMemoryCacheStore::new()))
        }
    }
}

fn build_embedder(config: &Config) -> Arc<dyn Embedder> {
    if config.mock_provider {
        tracing::warn!("SEMCACHE_MOCK_PROVIDER set, running embedder in stub mode");
        return Arc::new(MemoizedEmbedder::new(StubEmbedder::with_dimension(
            config.embedding_dim,
        )));
    }

    if !config.has_api_key() {
        tracing::warn!("OPENAI_API_KEY is not set; queries will fail until it is configured");
    }

    let embedder = OpenAiEmbedder::new(config.openai_api_key.clone())
        .with_base_url(config.openai_base_url.clone())
        .with_model(config.embedding_model.clone())
        .with_dimension(config.embedding_dim);
    Arc::new(MemoizedEmbedder::new(embedder))
}

fn build_generator(config: &Config) -> Arc<dyn Generator> {
    if config.mock_provider {
        Arc::new(MockGenerator::new().with_model(config.chat_model.clone()))
    } else {
        Arc::new(
            GenaiGenerator::new(config.chat_model.clone(), config.openai_api_key.clone())
                .with_base_url(config.openai_base_url.clone()),
        )
    }
}

async fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    {
        Ok(client) => client,
        Err(_) => return 1,
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
