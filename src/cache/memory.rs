// ABOUTME: In-memory cache implementation with LRU eviction, per-entry TTL and single-flight loads
// ABOUTME: Includes an optional background cleanup task for expired entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{CacheConfig, CacheLookup};
use dashmap::DashMap;
use lru::LruCache;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OnceCell, RwLock};

/// Cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

type Store<V> = Arc<RwLock<LruCache<String, CacheEntry<V>>>>;

/// Shared slot for a load in progress; `None` records a failed load
type InFlight<V> = Arc<OnceCell<Option<V>>>;

/// In-memory cache with LRU eviction, TTL expiry and single-flight loading
///
/// The store sits behind `Arc<RwLock<..>>` so the optional cleanup task can
/// share it. Loads in progress are tracked per key in a `DashMap`; every
/// concurrent caller for the same key awaits the same `OnceCell`, so the
/// loader runs once no matter how many callers miss together.
///
/// Share it behind an `Arc`; dropping the owner stops the cleanup task.
pub struct TtlCache<V> {
    store: Store<V>,
    in_flight: Arc<DashMap<String, InFlight<V>>>,
    ttl: Duration,
    shutdown_tx: Option<tokio::sync::mpsc::Sender<()>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Default cache capacity when config specifies zero entries
    const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a cache, spawning the cleanup task when enabled
    ///
    /// The cleanup task requires a running Tokio runtime.
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CACHE_CAPACITY);
        let store: Store<V> = Arc::new(RwLock::new(LruCache::new(capacity)));

        let shutdown_tx = if config.enable_background_cleanup {
            let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
            let store_clone = Arc::clone(&store);
            let cleanup_interval = config.cleanup_interval;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(cleanup_interval);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            Self::cleanup_expired(&store_clone).await;
                        }
                        _ = shutdown_rx.recv() => {
                            tracing::debug!("Cache cleanup task received shutdown signal");
                            break;
                        }
                    }
                }
            });

            Some(shutdown_tx)
        } else {
            None
        };

        Self {
            store,
            in_flight: Arc::new(DashMap::new()),
            ttl: config.ttl,
            shutdown_tx,
        }
    }

    /// Remove all expired entries from the store
    async fn cleanup_expired(store: &Store<V>) {
        let mut guard = store.write().await;

        let expired_keys: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            guard.pop(key);
        }
        drop(guard);

        if !expired_keys.is_empty() {
            tracing::debug!(removed = expired_keys.len(), "Cleaned up expired cache entries");
        }
    }

    /// Fetch a live entry, dropping it if it has expired
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut store = self.store.write().await;

        // LruCache::get is mutable (updates access order)
        let expired = match store.get(key) {
            Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            store.pop(key);
        }
        None
    }

    /// Store a value with the configured TTL, evicting the LRU entry when full
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        self.store
            .write()
            .await
            .push(key.into(), CacheEntry::new(value, self.ttl));
    }

    /// Return the cached value or run `load` once for all concurrent callers of `key`
    ///
    /// Only `Some` results are stored. A `None` result is handed to every caller
    /// that joined the same flight and is then forgotten, so the next call retries.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> CacheLookup<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<V>>,
    {
        if let Some(value) = self.get(key).await {
            return CacheLookup::Cached(value);
        }

        let cell = Arc::clone(
            self.in_flight
                .entry(key.to_owned())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );

        let mut leader = false;
        let outcome = cell
            .get_or_init(|| {
                leader = true;
                load()
            })
            .await
            .clone();

        if !leader {
            return outcome.map_or(CacheLookup::Failed, CacheLookup::Cached);
        }

        // Retires the flight even if this future is dropped while publishing
        let _flight = FlightGuard {
            in_flight: &self.in_flight,
            key,
            cell: &cell,
        };

        // Publish before retiring the flight so late arrivals hit the store
        if let Some(value) = &outcome {
            self.insert(key, value.clone()).await;
        }

        outcome.map_or(CacheLookup::Failed, CacheLookup::Loaded)
    }

    /// Remove one entry; returns whether it was present
    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.write().await.pop(key).is_some()
    }

    /// Remove every entry
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Number of live (unexpired) entries
    pub async fn len(&self) -> usize {
        self.store
            .read()
            .await
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .count()
    }

    /// Whether there are no live entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Maximum number of entries held before eviction
    pub async fn capacity(&self) -> usize {
        self.store.read().await.cap().get()
    }
}

/// Removes the leader's flight from `in_flight` when dropped
struct FlightGuard<'a, V> {
    in_flight: &'a DashMap<String, InFlight<V>>,
    key: &'a str,
    cell: &'a InFlight<V>,
}

impl<V> Drop for FlightGuard<'_, V> {
    fn drop(&mut self) {
        self.in_flight
            .remove_if(self.key, |_, current| Arc::ptr_eq(current, self.cell));
    }
}

impl<V> Drop for TtlCache<V> {
    fn drop(&mut self) {
        if let Some(tx) = &self.shutdown_tx {
            if let Err(e) = tx.try_send(()) {
                tracing::debug!(error = ?e, "Cache shutdown signal send failed");
            }
        }
    }
}
