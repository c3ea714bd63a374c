// ABOUTME: Converts (food, quantity, unit) to grams through mass units, inference, tables and a heuristic
// ABOUTME: Inference results are memoized in a bounded TTL cache with single-flight loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unit Converter
//!
//! Resolution order, first match wins:
//!
//! 1. Mass units (`g`, `mg`, `kg`, `oz`, `lb`): exact factor, no external call.
//! 2. Food-aware inference, when a [`UnitInferenceProvider`] is configured.
//!    Answers are cached per normalized `(food, quantity, unit)`.
//! 3. Household measures and piece weights from [`super::units`].
//! 4. `quantity * 100`, logged and counted as a conversion fallback.
//!
//! [`UnitConverter::convert`] never fails and never returns a negative weight.

use super::units;
use super::ResolutionCounters;
use crate::cache::{CacheConfig, CacheLookup, ConversionKey, TtlCache};
use crate::constants::{inference::HEURISTIC_GRAMS_PER_UNIT, timeouts};
use crate::llm::unit_inference::build_conversion_prompt;
use crate::llm::UnitInferenceProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Which tier produced a gram weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMethod {
    /// Quantity was zero, negative or not finite, or its weight overflowed
    ZeroQuantity,
    /// Exact mass-unit factor
    MassUnit,
    /// Fresh answer from the inference collaborator
    Inferred,
    /// Previously inferred answer served from cache
    Cached,
    /// Household measure or piece-weight table
    ReferenceTable,
    /// `quantity * 100` last resort
    Heuristic,
}

/// Result of a unit conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    /// Weight in grams, always finite and non-negative
    pub grams: f64,
    /// Tier that produced `grams`
    pub method: ConversionMethod,
}

impl Conversion {
    const fn new(grams: f64, method: ConversionMethod) -> Self {
        Self { grams, method }
    }
}

/// Tiered food-aware unit converter
pub struct UnitConverter {
    inference: Option<Arc<dyn UnitInferenceProvider>>,
    cache: TtlCache<f64>,
    inference_timeout: Duration,
    counters: Arc<ResolutionCounters>,
}

impl UnitConverter {
    /// Converter with only the deterministic tiers
    #[must_use]
    pub fn deterministic(counters: Arc<ResolutionCounters>) -> Self {
        Self::new(None, &CacheConfig::conversion_default(), counters)
    }

    /// Converter with an optional inference tier and its cache
    #[must_use]
    pub fn new(
        inference: Option<Arc<dyn UnitInferenceProvider>>,
        cache_config: &CacheConfig,
        counters: Arc<ResolutionCounters>,
    ) -> Self {
        Self {
            inference,
            cache: TtlCache::new(cache_config),
            inference_timeout: Duration::from_secs(timeouts::UNIT_INFERENCE_TIMEOUT_SECS),
            counters,
        }
    }

    /// Bound on one inference call
    #[must_use]
    pub const fn with_inference_timeout(mut self, timeout: Duration) -> Self {
        self.inference_timeout = timeout;
        self
    }

    /// Whether the inference tier is wired
    #[must_use]
    pub fn has_inference(&self) -> bool {
        self.inference.is_some()
    }

    /// Convert `quantity unit` of `food_name` to grams
    pub async fn convert(&self, food_name: &str, quantity: f64, unit: &str) -> Conversion {
        let conversion = self.convert_by_tier(food_name, quantity, unit).await;
        if conversion.grams.is_finite() {
            return conversion;
        }

        self.counters.record_conversion_fallback();
        warn!(
            food = food_name,
            quantity,
            unit,
            method = ?conversion.method,
            "Converted weight is not finite; treating quantity as unusable"
        );
        Conversion::new(0.0, ConversionMethod::ZeroQuantity)
    }

    async fn convert_by_tier(&self, food_name: &str, quantity: f64, unit: &str) -> Conversion {
        if !quantity.is_finite() || quantity <= 0.0 {
            debug!(food = food_name, quantity, "Non-positive quantity converts to 0 g");
            return Conversion::new(0.0, ConversionMethod::ZeroQuantity);
        }

        let unit_norm = unit.trim().to_lowercase();
        let unit_norm = if unit_norm.is_empty() {
            "g".to_owned()
        } else {
            unit_norm
        };

        if let Some(factor) = units::mass_factor(&unit_norm) {
            return Conversion::new(quantity * factor, ConversionMethod::MassUnit);
        }

        if let Some(provider) = &self.inference {
            let key = ConversionKey::new(food_name, quantity, &unit_norm).to_string();
            let lookup = self
                .cache
                .get_or_load(&key, || self.infer(provider, food_name, quantity, &unit_norm))
                .await;
            match lookup {
                CacheLookup::Cached(grams) => {
                    return Conversion::new(grams, ConversionMethod::Cached);
                }
                CacheLookup::Loaded(grams) => {
                    info!(
                        food = food_name,
                        quantity,
                        unit = %unit_norm,
                        grams,
                        "Inferred unit conversion"
                    );
                    return Conversion::new(grams, ConversionMethod::Inferred);
                }
                CacheLookup::Failed => {}
            }
        }

        if let Some(grams) = units::reference_grams(food_name, quantity, &unit_norm) {
            debug!(
                food = food_name,
                quantity,
                unit = %unit_norm,
                grams,
                "Reference table conversion"
            );
            return Conversion::new(grams, ConversionMethod::ReferenceTable);
        }

        let grams = quantity * HEURISTIC_GRAMS_PER_UNIT;
        self.counters.record_conversion_fallback();
        warn!(
            food = food_name,
            quantity,
            unit = %unit_norm,
            grams,
            "Conversion fallback: assuming 100 g per unit"
        );
        Conversion::new(grams, ConversionMethod::Heuristic)
    }

    /// Convert and return only the weight
    pub async fn convert_grams(&self, food_name: &str, quantity: f64, unit: &str) -> f64 {
        self.convert(food_name, quantity, unit).await.grams
    }

    /// One bounded inference call; `None` on any failure
    async fn infer(
        &self,
        provider: &Arc<dyn UnitInferenceProvider>,
        food_name: &str,
        quantity: f64,
        unit: &str,
    ) -> Option<f64> {
        self.counters.record_inference_call();
        let prompt = build_conversion_prompt(food_name, quantity, unit);

        match tokio::time::timeout(self.inference_timeout, provider.infer_grams(&prompt)).await {
            Ok(Ok(grams)) if grams.is_finite() && grams >= 0.0 => Some(grams),
            Ok(Ok(grams)) => {
                warn!(food = food_name, unit, grams, "Unit inference returned an invalid weight");
                None
            }
            Ok(Err(e)) => {
                warn!(food = food_name, unit, error = %e, "Unit inference failed");
                None
            }
            Err(_) => {
                warn!(
                    food = food_name,
                    unit,
                    timeout_ms = self.inference_timeout.as_millis() as u64,
                    "Unit inference timed out"
                );
                None
            }
        }
    }

    /// Number of live cached conversions
    pub async fn cache_len(&self) -> usize {
        self.cache.len().await
    }

    /// Drop every cached conversion
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Drop the cached conversion for one input; returns whether it existed
    pub async fn invalidate(&self, food_name: &str, quantity: f64, unit: &str) -> bool {
        let key = ConversionKey::new(food_name, quantity, unit).to_string();
        self.cache.invalidate(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> UnitConverter {
        UnitConverter::deterministic(Arc::new(ResolutionCounters::default()))
    }

    #[tokio::test]
    async fn test_empty_unit_means_grams() {
        let conversion = converter().convert("rice", 80.0, "  ").await;
        assert_eq!(conversion.method, ConversionMethod::MassUnit);
        assert!((conversion.grams - 80.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_non_finite_quantity_is_zero() {
        let c = converter();
        for quantity in [f64::NAN, f64::INFINITY, -1.0, 0.0] {
            let conversion = c.convert("rice", quantity, "cup").await;
            assert_eq!(conversion.method, ConversionMethod::ZeroQuantity);
            assert!(conversion.grams.abs() < f64::EPSILON);
        }
    }
}
