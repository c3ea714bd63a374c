// ABOUTME: Unit tests for the in-memory TTL cache
// ABOUTME: Tests LRU eviction, expiry, single-flight loads and failed-load retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use futures_util::future::join_all;
use nutrition_engine::cache::memory::TtlCache;
use nutrition_engine::cache::{CacheConfig, CacheLookup};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn create_test_cache(max_entries: usize, ttl: Duration) -> TtlCache<f64> {
    TtlCache::new(&CacheConfig {
        max_entries,
        ttl,
        cleanup_interval: Duration::from_secs(300),
        enable_background_cleanup: false, // Disable in tests to avoid tokio runtime conflicts
    })
}

#[tokio::test]
async fn test_cache_set_and_get() {
    let cache = create_test_cache(10, Duration::from_secs(60));

    cache.insert("rice|1|cup", 240.0).await;

    assert_eq!(cache.get("rice|1|cup").await, Some(240.0));
    assert_eq!(cache.get("rice|2|cup").await, None);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_cache_expiration() {
    let cache = create_test_cache(10, Duration::from_millis(50));
    cache.insert("egg|1|piece", 50.0).await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(cache.get("egg|1|piece").await, None);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_least_recently_used_entry_is_evicted() {
    let cache = create_test_cache(2, Duration::from_secs(60));
    cache.insert("a", 1.0).await;
    cache.insert("b", 2.0).await;

    // touching "a" makes "b" the eviction candidate
    assert_eq!(cache.get("a").await, Some(1.0));
    cache.insert("c", 3.0).await;

    assert_eq!(cache.get("a").await, Some(1.0));
    assert_eq!(cache.get("b").await, None);
    assert_eq!(cache.get("c").await, Some(3.0));
    assert_eq!(cache.capacity().await, 2);
}

#[tokio::test]
async fn test_get_or_load_reports_how_value_was_obtained() {
    let cache = create_test_cache(10, Duration::from_secs(60));

    let first = cache.get_or_load("k", || async { Some(185.0) }).await;
    let second = cache.get_or_load("k", || async { Some(-1.0) }).await;

    assert_eq!(first, CacheLookup::Loaded(185.0));
    assert_eq!(second, CacheLookup::Cached(185.0));
}

#[tokio::test]
async fn test_failed_load_is_not_stored() {
    let cache = create_test_cache(10, Duration::from_secs(60));
    let calls = AtomicUsize::new(0);

    let failed = cache
        .get_or_load("k", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            None
        })
        .await;
    let retried = cache
        .get_or_load("k", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(30.0)
        })
        .await;

    assert_eq!(failed, CacheLookup::Failed);
    assert_eq!(retried, CacheLookup::Loaded(30.0));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_misses_share_one_load() {
    let cache = Arc::new(create_test_cache(10, Duration::from_secs(60)));
    let calls = Arc::new(AtomicUsize::new(0));

    let tasks = (0..16).map(|_| {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        tokio::spawn(async move {
            cache
                .get_or_load("dal|1|katori", || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Some(150.0)
                })
                .await
                .into_value()
        })
    });

    let values = join_all(tasks).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for value in values {
        assert_eq!(value.unwrap(), Some(150.0));
    }
}

#[tokio::test]
async fn test_invalidate_and_clear() {
    let cache = create_test_cache(10, Duration::from_secs(60));
    cache.insert("a", 1.0).await;
    cache.insert("b", 2.0).await;

    assert!(cache.invalidate("a").await);
    assert!(!cache.invalidate("a").await);
    assert_eq!(cache.len().await, 1);

    cache.clear().await;
    assert!(cache.is_empty().await);
}
