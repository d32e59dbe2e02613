//! Background purge of expired entries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time;
use tracing::{debug, info, warn};

use super::SemanticCache;

/// Seconds between purge passes.
pub const REAPER_INTERVAL_SECS: u64 = 60;

/// Periodically calls [`SemanticCache::purge_expired`] until stopped.
#[derive(Debug)]
pub struct ExpiryReaper {
    cache: Arc<SemanticCache>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl ExpiryReaper {
    pub fn new(cache: Arc<SemanticCache>) -> Self {
        Self::with_interval(cache, Duration::from_secs(REAPER_INTERVAL_SECS))
    }

    pub fn with_interval(cache: Arc<SemanticCache>, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts the reaper task (no-op if already running).
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        if self.running.swap(true, Ordering::AcqRel) {
            return tokio::spawn(async {});
        }

        let cache = Arc::clone(&self.cache);
        let running = Arc::clone(&self.running);
        let shutdown = Arc::clone(&self.shutdown);
        let period = self.interval;

        tokio::spawn(async move {
            let mut interval = time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = shutdown.notified() => break,
                }

                match cache.purge_expired().await {
                    Ok(0) => debug!("Reaper pass found nothing to purge"),
                    Ok(purged) => info!(purged, "Purged expired cache entries"),
                    Err(e) => warn!(error = %e, "Reaper pass failed"),
                }
            }

            running.store(false, Ordering::Release);
            debug!("Expiry reaper stopped");
        })
    }

    /// Signals the task to exit after its current pass.
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }
}
