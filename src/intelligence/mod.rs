// ABOUTME: Food resolution pipeline: unit conversion, nutrient lookup, meal aggregation, RDA scoring
// ABOUTME: Also holds the shared degradation counters every tier reports into
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Intelligence Module
//!
//! The resolution pipeline. [`UnitConverter`] turns a user quantity into
//! grams, [`NutrientSourceResolver`] turns grams into a nutrient record,
//! [`MealAggregator`] composes both over a list of items, and
//! [`RdaEvaluator`] scores an intake independently.

/// Embedded per-100 g reference foods
pub mod local_foods;
/// Meal aggregation with bounded concurrency
pub mod meal_aggregator;
/// Remote, local and unresolved nutrient tiers
pub mod nutrient_resolver;
/// Intake scoring against daily allowances
pub mod rda_evaluator;
/// Tiered unit-to-grams conversion
pub mod unit_converter;
/// Deterministic unit tables
pub mod units;

pub use meal_aggregator::{AggregationMode, MealAggregator};
pub use nutrient_resolver::{NutrientSourceResolver, UNRESOLVED_ERROR};
pub use rda_evaluator::{
    Allowance, AllowanceTable, NutrientScore, RdaEvaluator, RdaNutrient, RdaResult,
    StandardAllowances, STANDARD_ALLOWANCES,
};
pub use unit_converter::{Conversion, ConversionMethod, UnitConverter};

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Degradation counters shared by every tier of one engine
#[derive(Debug, Default)]
pub struct ResolutionCounters {
    conversion_fallbacks: AtomicU64,
    inference_calls: AtomicU64,
    remote_misses: AtomicU64,
    unresolved: AtomicU64,
}

impl ResolutionCounters {
    /// A conversion fell through to the ×100 heuristic
    pub fn record_conversion_fallback(&self) {
        self.conversion_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// One call was issued to the inference collaborator
    pub fn record_inference_call(&self) {
        self.inference_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// A configured remote source failed, timed out or found nothing
    pub fn record_remote_miss(&self) {
        self.remote_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// No tier matched a food
    pub fn record_unresolved(&self) {
        self.unresolved.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy
    #[must_use]
    pub fn snapshot(&self) -> EngineStats {
        EngineStats {
            conversion_fallbacks: self.conversion_fallbacks.load(Ordering::Relaxed),
            inference_calls: self.inference_calls.load(Ordering::Relaxed),
            remote_misses: self.remote_misses.load(Ordering::Relaxed),
            unresolved_foods: self.unresolved.load(Ordering::Relaxed),
        }
    }
}

/// Counter values at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Conversions answered by the ×100 heuristic
    pub conversion_fallbacks: u64,
    /// Inference calls issued (cache hits excluded)
    pub inference_calls: u64,
    /// Remote lookups that degraded to the local table
    pub remote_misses: u64,
    /// Foods no tier could resolve
    pub unresolved_foods: u64,
}
