//! Per-fingerprint miss serialization.
//!
//! Only one caller at a time holds the flight for a given fingerprint. Holders re-check the
//! cache before generating; [`FlightGuard::waited`] reports whether another holder went first.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type FlightTable = HashMap<[u8; 32], Arc<AsyncMutex<()>>>;

#[derive(Debug, Default, Clone)]
pub struct SingleFlight {
    table: Arc<Mutex<FlightTable>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive use of `key`.
    pub async fn acquire(&self, key: [u8; 32]) -> FlightGuard {
        let lock = {
            let mut table = self.table.lock();
            Arc::clone(table.entry(key).or_default())
        };

        let (guard, waited) = match Arc::clone(&lock).try_lock_owned() {
            Ok(guard) => (guard, false),
            Err(_) => (Arc::clone(&lock).lock_owned().await, true),
        };

        FlightGuard {
            key,
            lock,
            guard: Some(guard),
            waited,
            table: Arc::clone(&self.table),
        }
    }

    /// Number of fingerprints with an active or pending flight.
    pub fn in_flight(&self) -> usize {
        self.table.lock().len()
    }
}

/// Held while a miss for one fingerprint is being generated and stored.
#[derive(Debug)]
pub struct FlightGuard {
    key: [u8; 32],
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
    waited: bool,
    table: Arc<Mutex<FlightTable>>,
}

impl FlightGuard {
    /// `true` if another caller held this fingerprint when we arrived.
    #[inline]
    pub fn waited(&self) -> bool {
        self.waited
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut table = self.table.lock();
        let idle = table
            .get(&self.key)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2);
        if idle {
            table.remove(&self.key);
        }
    }
}
