// ABOUTME: USDA FoodData Central API client for nutrient lookups by food name
// ABOUTME: Implements best-match search with a bounded timeout and a TTL result cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! USDA `FoodData` Central API Client
//!
//! Wraps `GET {base_url}/foods/search`. The API is free but requires an API
//! key. Successful matches are cached for 24 hours by default; failures and
//! empty results are not cached.
//!
//! # API Reference
//! USDA `FoodData` Central API: <https://fdc.nal.usda.gov/api-guide.html>
//!
//! # Example
//! ```rust,no_run
//! use nutrition_engine::external::{FoodCompositionSource, UsdaClient, UsdaClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = UsdaClient::new(UsdaClientConfig {
//!     api_key: "your_api_key".to_owned(),
//!     ..UsdaClientConfig::default()
//! })?;
//! let best = client.search("banana raw", "Foundation,SR Legacy", 1).await?;
//! # Ok(())
//! # }
//! ```

use super::{FoodCompositionSource, FoodMatch, FoodNutrient};
use crate::cache::{CacheConfig, TtlCache};
use crate::config::UsdaConfig;
use crate::constants::{cache, timeouts, usda};
use crate::errors::{AppError, AppResult, ErrorCode};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE: &str = "USDA API";

/// USDA API client configuration
#[derive(Debug, Clone)]
pub struct UsdaClientConfig {
    /// USDA API key (free from <https://fdc.nal.usda.gov/api-key-signup.html>)
    pub api_key: String,
    /// Base URL for USDA API (default: <https://api.nal.usda.gov/fdc/v1>)
    pub base_url: String,
    /// Whole-request timeout (default: 15 seconds)
    pub timeout: Duration,
    /// Search result cache sizing and TTL (default: 24 hours)
    pub cache: CacheConfig,
}

impl Default for UsdaClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: usda::DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(timeouts::USDA_REQUEST_TIMEOUT_SECS),
            cache: CacheConfig::food_search_default(),
        }
    }
}

impl UsdaClientConfig {
    /// Client configuration from engine settings; `None` without an API key
    #[must_use]
    pub fn from_usda_config(config: &UsdaConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            api_key,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
            cache: CacheConfig {
                ttl: config.cache_ttl,
                max_entries: cache::DEFAULT_SEARCH_CACHE_MAX_ENTRIES,
                ..CacheConfig::food_search_default()
            },
        })
    }
}

/// USDA API search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    fdc_id: Option<u64>,
    #[serde(default)]
    description: String,
    data_type: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<SearchNutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNutrient {
    nutrient_id: Option<u32>,
    value: Option<f64>,
}

impl From<SearchFood> for FoodMatch {
    fn from(food: SearchFood) -> Self {
        let nutrients = food
            .food_nutrients
            .into_iter()
            .filter_map(|n| {
                Some(FoodNutrient {
                    nutrient_id: n.nutrient_id?,
                    amount: n.value.unwrap_or(0.0),
                })
            })
            .collect();

        Self {
            fdc_id: food.fdc_id,
            description: food.description,
            data_type: food.data_type,
            nutrients,
        }
    }
}

/// USDA `FoodData` Central API Client
pub struct UsdaClient {
    config: UsdaClientConfig,
    http_client: reqwest::Client,
    search_cache: TtlCache<FoodMatch>,
}

impl UsdaClient {
    /// Create a new USDA API client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: UsdaClientConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        let search_cache = TtlCache::new(&config.cache);

        Ok(Self {
            config,
            http_client,
            search_cache,
        })
    }

    fn cache_key(query: &str, dataset_filter: &str, page_size: u32) -> String {
        format!(
            "{}|{dataset_filter}|{page_size}",
            query.trim().to_lowercase()
        )
    }

    fn status_error(status: StatusCode, body: &str) -> AppError {
        let snippet: String = body.chars().take(200).collect();
        match status.as_u16() {
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{SERVICE}: HTTP {status}"),
            ),
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("{SERVICE}: HTTP {status}"),
            ),
            _ => AppError::external_service(SERVICE, format!("HTTP {status}: {snippet}")),
        }
    }

    fn transport_error(&self, e: &reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::external_timeout(SERVICE, self.config.timeout)
        } else if e.is_connect() {
            AppError::external_unavailable(SERVICE, e.to_string())
        } else {
            AppError::external_service(SERVICE, e.to_string())
        }
    }

    /// Clear the search cache (useful for testing)
    pub async fn clear_cache(&self) {
        self.search_cache.clear().await;
    }

    /// Number of cached search matches (useful for monitoring)
    pub async fn cache_len(&self) -> usize {
        self.search_cache.len().await
    }
}

#[async_trait]
impl FoodCompositionSource for UsdaClient {
    fn name(&self) -> &'static str {
        "usda"
    }

    async fn search(
        &self,
        query: &str,
        dataset_filter: &str,
        page_size: u32,
    ) -> AppResult<Option<FoodMatch>> {
        if query.trim().is_empty() {
            return Err(AppError::invalid_input("Search query cannot be empty"));
        }
        if page_size == 0 || page_size > 200 {
            return Err(AppError::invalid_input(
                "Page size must be between 1 and 200",
            ));
        }

        let cache_key = Self::cache_key(query, dataset_filter, page_size);
        if let Some(hit) = self.search_cache.get(&cache_key).await {
            debug!(query, "USDA search cache hit");
            return Ok(Some(hit));
        }

        let url = format!(
            "{}/foods/search",
            self.config.base_url.trim_end_matches('/')
        );
        let page_size = page_size.to_string();
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", query),
                ("dataType", dataset_filter),
                ("pageSize", page_size.as_str()),
                ("api_key", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = Self::status_error(status, &body);
            warn!(query, status = status.as_u16(), "USDA search failed");
            return Err(error);
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(&e)
            } else {
                AppError::external_service(SERVICE, format!("JSON parse error: {e}"))
            }
        })?;

        let Some(best) = parsed.foods.into_iter().next().map(FoodMatch::from) else {
            debug!(query, "USDA search returned no foods");
            return Ok(None);
        };

        self.search_cache.insert(cache_key, best.clone()).await;
        Ok(Some(best))
    }
}
