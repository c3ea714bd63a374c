// ABOUTME: Environment-driven configuration for the nutrition engine and its optional collaborators
// ABOUTME: Rejects unparseable values with ConfigInvalid naming the offending variable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Engine Configuration
//!
//! Configuration is environment-only. Every value has a default, and a missing
//! collaborator (no `USDA_API_KEY`, no `LOCAL_LLM_BASE_URL`) simply removes that
//! tier from the pipeline instead of failing startup.

use crate::cache::CacheConfig;
use crate::constants::{cache, inference, meal, rda, timeouts, usda};
use crate::errors::{AppError, AppResult};
use crate::intelligence::meal_aggregator::AggregationMode;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Remote food-composition search settings
#[derive(Debug, Clone)]
pub struct UsdaConfig {
    /// API key; the remote tier is disabled without one
    pub api_key: Option<String>,
    /// Base URL of the search service
    pub base_url: String,
    /// Bound on one search request
    pub timeout: Duration,
    /// Lifetime of cached search matches
    pub cache_ttl: Duration,
}

impl Default for UsdaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: usda::DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(timeouts::USDA_REQUEST_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(cache::TTL_FOOD_SEARCH_SECS),
        }
    }
}

impl UsdaConfig {
    /// Load from `USDA_*` variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when a numeric variable cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            api_key: non_empty_var("USDA_API_KEY"),
            base_url: non_empty_var("USDA_BASE_URL")
                .unwrap_or_else(|| usda::DEFAULT_BASE_URL.to_owned()),
            timeout: Duration::from_secs(parse_var(
                "USDA_TIMEOUT_SECS",
                timeouts::USDA_REQUEST_TIMEOUT_SECS,
            )?),
            cache_ttl: Duration::from_secs(parse_var(
                "USDA_CACHE_TTL_SECS",
                cache::TTL_FOOD_SEARCH_SECS,
            )?),
        })
    }

    /// Whether the remote tier should be wired
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Unit-inference endpoint settings
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// OpenAI-compatible base URL; the inference tier is disabled without one
    pub base_url: Option<String>,
    /// Model name sent with each request
    pub model: String,
    /// Optional bearer token
    pub api_key: Option<String>,
    /// Bound on one inference call
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: inference::DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(timeouts::UNIT_INFERENCE_TIMEOUT_SECS),
        }
    }
}

impl InferenceConfig {
    /// Load from `LOCAL_LLM_*` and `UNIT_INFERENCE_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when the timeout cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            base_url: non_empty_var("LOCAL_LLM_BASE_URL"),
            model: non_empty_var("LOCAL_LLM_MODEL")
                .unwrap_or_else(|| inference::DEFAULT_MODEL.to_owned()),
            api_key: non_empty_var("LOCAL_LLM_API_KEY"),
            timeout: Duration::from_secs(parse_var(
                "UNIT_INFERENCE_TIMEOUT_SECS",
                timeouts::UNIT_INFERENCE_TIMEOUT_SECS,
            )?),
        })
    }

    /// Whether the inference tier should be wired
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }
}

/// Complete engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Remote nutrient search
    pub usda: UsdaConfig,
    /// Unit inference
    pub inference: InferenceConfig,
    /// Conversion cache sizing and lifetime
    pub conversion_cache: CacheConfig,
    /// Default meal resolution mode
    pub meal_mode: AggregationMode,
    /// Items resolved concurrently per meal
    pub meal_concurrency: usize,
    /// Percentage of RDA below which a nutrient is deficient
    pub deficiency_threshold_percent: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            usda: UsdaConfig::default(),
            inference: InferenceConfig::default(),
            conversion_cache: CacheConfig::conversion_default(),
            meal_mode: AggregationMode::default(),
            meal_concurrency: meal::DEFAULT_CONCURRENCY,
            deficiency_threshold_percent: rda::DEFAULT_DEFICIENCY_THRESHOLD_PERCENT,
        }
    }
}

impl EngineConfig {
    /// Load the full configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the first variable that is set but malformed
    pub fn from_env() -> AppResult<Self> {
        let max_entries = parse_var(
            "UNIT_CACHE_MAX_ENTRIES",
            cache::DEFAULT_CONVERSION_CACHE_MAX_ENTRIES,
        )?;
        if max_entries == 0 {
            return Err(AppError::config_invalid(
                "UNIT_CACHE_MAX_ENTRIES",
                "must be at least 1",
            ));
        }
        let ttl_secs = parse_var("UNIT_CACHE_TTL_SECS", cache::TTL_CONVERSION_SECS)?;

        let meal_mode = match non_empty_var("MEAL_RESOLUTION_MODE") {
            Some(raw) => raw
                .parse::<AggregationMode>()
                .map_err(|e| AppError::config_invalid("MEAL_RESOLUTION_MODE", e.message))?,
            None => AggregationMode::default(),
        };

        let meal_concurrency = parse_var("MEAL_CONCURRENCY", meal::DEFAULT_CONCURRENCY)?;
        if meal_concurrency == 0 {
            return Err(AppError::config_invalid(
                "MEAL_CONCURRENCY",
                "must be at least 1",
            ));
        }

        let threshold = parse_var(
            "RDA_DEFICIENCY_THRESHOLD_PERCENT",
            rda::DEFAULT_DEFICIENCY_THRESHOLD_PERCENT,
        )?;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AppError::config_invalid(
                "RDA_DEFICIENCY_THRESHOLD_PERCENT",
                "must be a non-negative number",
            ));
        }

        Ok(Self {
            usda: UsdaConfig::from_env()?,
            inference: InferenceConfig::from_env()?,
            conversion_cache: CacheConfig {
                max_entries,
                ttl: Duration::from_secs(ttl_secs),
                ..CacheConfig::conversion_default()
            },
            meal_mode,
            meal_concurrency,
            deficiency_threshold_percent: threshold,
        })
    }
}

/// Read a variable, treating empty or whitespace-only values as unset
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Parse a variable if present, falling back to `default` when unset
fn parse_var<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    non_empty_var(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| AppError::config_invalid(key, format!("'{raw}' is not valid: {e}")))
    })
}
