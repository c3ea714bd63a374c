// ABOUTME: Engine-wide constants and defaults for timeouts, caches, rounding and RDA scoring
// ABOUTME: Environment overrides for these values are read by the config module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Defaults grouped by concern. Anything an operator may want to tune is
//! mirrored by an environment variable in [`crate::config`].

/// Service identification used in structured logs
pub mod service_names {
    /// Service name reported at startup
    pub const NUTRITION_ENGINE: &str = "nutrition-engine";
}

/// Conversion and search cache defaults
pub mod cache {
    /// Default maximum entries in the unit conversion cache
    pub const DEFAULT_CONVERSION_CACHE_MAX_ENTRIES: usize = 10_000;

    /// Conversion cache TTL (7 days) - food-aware unit estimates are stable
    pub const TTL_CONVERSION_SECS: u64 = 604_800;

    /// Remote food search cache TTL (24 hours)
    pub const TTL_FOOD_SEARCH_SECS: u64 = 86_400;

    /// Default maximum entries in the remote food search cache
    pub const DEFAULT_SEARCH_CACHE_MAX_ENTRIES: usize = 2_000;

    /// Default cleanup interval in seconds for expired entries
    pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
}

/// Timeouts for external collaborators
pub mod timeouts {
    /// Remote nutrient lookup bound
    pub const USDA_REQUEST_TIMEOUT_SECS: u64 = 15;

    /// Unit inference bound (one short completion)
    pub const UNIT_INFERENCE_TIMEOUT_SECS: u64 = 10;

    /// TCP connect bound for the inference endpoint
    pub const LLM_CONNECT_TIMEOUT_SECS: u64 = 5;
}

/// USDA `FoodData` Central defaults
pub mod usda {
    /// Base URL for the `FoodData` Central API
    pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

    /// Dataset categories trusted for generic food lookups
    pub const TRUSTED_DATA_TYPES: &str = "Foundation,SR Legacy";

    /// Only the single best match is requested
    pub const BEST_MATCH_PAGE_SIZE: u32 = 1;
}

/// Unit inference request parameters
pub mod inference {
    /// Default model for the OpenAI-compatible endpoint
    pub const DEFAULT_MODEL: &str = "qwen2.5:14b-instruct";

    /// A bare number never needs more than a handful of tokens
    pub const MAX_TOKENS: u32 = 10;

    /// Near-deterministic sampling
    pub const TEMPERATURE: f32 = 0.1;

    /// Grams assumed per unit when every other tier fails
    pub const HEURISTIC_GRAMS_PER_UNIT: f64 = 100.0;
}

/// Numeric policy shared by every resolution tier
pub mod rounding {
    /// Decimal places kept for nutrient amounts (per record and meal totals)
    pub const NUTRIENT_DECIMALS: i32 = 2;

    /// Decimal places kept for RDA percentages
    pub const RDA_PERCENT_DECIMALS: i32 = 1;
}

/// RDA scoring defaults
pub mod rda {
    /// Intake below this percentage of the allowance is reported as a deficiency
    pub const DEFAULT_DEFICIENCY_THRESHOLD_PERCENT: f64 = 50.0;
}

/// Meal aggregation defaults
pub mod meal {
    /// Items resolved concurrently within one meal
    pub const DEFAULT_CONCURRENCY: usize = 4;
}
