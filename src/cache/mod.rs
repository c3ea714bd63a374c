// ABOUTME: Cache layer for unit conversions and remote food search results
// ABOUTME: Bounded LRU storage with per-entry TTL and single-flight loading of misses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// In-memory TTL cache with single-flight loading
pub mod memory;

use crate::constants::cache::{
    DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_CONVERSION_CACHE_MAX_ENTRIES,
    DEFAULT_SEARCH_CACHE_MAX_ENTRIES, TTL_CONVERSION_SECS, TTL_FOOD_SEARCH_SECS,
};
use std::fmt;
use std::time::Duration;

pub use memory::TtlCache;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before LRU eviction
    pub max_entries: usize,
    /// Lifetime of each entry
    pub ttl: Duration,
    /// Cleanup interval for expired entries
    pub cleanup_interval: Duration,
    /// Enable background cleanup task (should be false in tests to avoid runtime conflicts)
    pub enable_background_cleanup: bool,
}

impl CacheConfig {
    /// Defaults for the unit conversion cache
    #[must_use]
    pub const fn conversion_default() -> Self {
        Self {
            max_entries: DEFAULT_CONVERSION_CACHE_MAX_ENTRIES,
            ttl: Duration::from_secs(TTL_CONVERSION_SECS),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: false,
        }
    }

    /// Defaults for the remote food search cache
    #[must_use]
    pub const fn food_search_default() -> Self {
        Self {
            max_entries: DEFAULT_SEARCH_CACHE_MAX_ENTRIES,
            ttl: Duration::from_secs(TTL_FOOD_SEARCH_SECS),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::conversion_default()
    }
}

/// Normalized key for a `(food, quantity, unit)` conversion
///
/// Food name and unit are trimmed and lower-cased so that "Rice"/" CUP" and
/// "rice"/"cup" share one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionKey {
    /// Normalized food name
    pub food: String,
    /// Requested quantity
    pub quantity: f64,
    /// Normalized unit
    pub unit: String,
}

impl ConversionKey {
    /// Build a normalized key
    #[must_use]
    pub fn new(food: &str, quantity: f64, unit: &str) -> Self {
        Self {
            food: food.trim().to_lowercase(),
            quantity,
            unit: unit.trim().to_lowercase(),
        }
    }
}

impl fmt::Display for ConversionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.food, self.quantity, self.unit)
    }
}

/// How a `get_or_load` call was satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<V> {
    /// Served from storage, or from a load another caller already had in flight
    Cached(V),
    /// This caller ran the loader and the value is now stored
    Loaded(V),
    /// The loader produced nothing; nothing was stored
    Failed,
}

impl<V> CacheLookup<V> {
    /// The value, if any
    pub fn into_value(self) -> Option<V> {
        match self {
            Self::Cached(v) | Self::Loaded(v) => Some(v),
            Self::Failed => None,
        }
    }
}
