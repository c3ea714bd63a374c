// ABOUTME: Integration tests for tiered nutrient resolution
// ABOUTME: Remote matches, degradation to the local table, unresolved records and scaling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use common::{food_match, ScriptedFoodSource};
use nutrition_engine::intelligence::{NutrientSourceResolver, ResolutionCounters, UNRESOLVED_ERROR};
use nutrition_engine::models::NutrientSource;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod common;

fn local_only() -> (NutrientSourceResolver, Arc<ResolutionCounters>) {
    common::init_test_logging();
    let counters = Arc::new(ResolutionCounters::default());
    (NutrientSourceResolver::new(None, Arc::clone(&counters)), counters)
}

fn with_source(
    source: Arc<ScriptedFoodSource>,
) -> (NutrientSourceResolver, Arc<ResolutionCounters>) {
    common::init_test_logging();
    let counters = Arc::new(ResolutionCounters::default());
    (
        NutrientSourceResolver::new(Some(source), Arc::clone(&counters)),
        counters,
    )
}

// ============================================================================
// Local and unresolved tiers
// ============================================================================

#[tokio::test]
async fn test_rice_scales_from_local_table() {
    let (resolver, counters) = local_only();
    let record = resolver.resolve("rice", 240.0).await;

    assert_eq!(record.source, NutrientSource::Local);
    assert!((record.nutrients.calories - 312.0).abs() < 1e-9);
    assert!((record.nutrients.protein_g - 6.48).abs() < 1e-9);
    assert_eq!(record.serving_label, "240g");
    assert!(record.error.is_none());
    assert_eq!(counters.snapshot().remote_misses, 0);
}

#[tokio::test]
async fn test_egg_scales_from_local_table() {
    let (resolver, _) = local_only();
    let record = resolver.resolve("egg", 100.0).await;

    assert_eq!(record.source, NutrientSource::Local);
    assert!((record.nutrients.calories - 155.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_unknown_food_is_unresolved_not_an_error() {
    let (resolver, counters) = local_only();
    let record = resolver.resolve("unobtainium_snack_42", 100.0).await;

    assert_eq!(record.source, NutrientSource::Unresolved);
    assert!(record.nutrients.calories.abs() < f64::EPSILON);
    assert_eq!(record.error.as_deref(), Some(UNRESOLVED_ERROR));
    assert!(!record.is_resolved());
    assert_eq!(counters.snapshot().unresolved_foods, 1);
}

#[tokio::test]
async fn test_local_calories_scale_linearly() {
    let (resolver, _) = local_only();
    let base = resolver.resolve_local("banana", 100.0).nutrients.calories;
    for grams in [1.0, 37.5, 120.0, 450.0] {
        let scaled = resolver.resolve_local("banana", grams).nutrients.calories;
        assert!(
            (scaled - base * grams / 100.0).abs() <= 0.01,
            "{grams} g -> {scaled} kcal"
        );
    }
}

#[tokio::test]
async fn test_negative_grams_resolve_as_zero() {
    let (resolver, _) = local_only();
    let record = resolver.resolve_local("rice", -50.0);

    assert_eq!(record.source, NutrientSource::Local);
    assert!(record.nutrients.calories.abs() < f64::EPSILON);
    assert_eq!(record.serving_label, "0g");
}

// ============================================================================
// Remote tier
// ============================================================================

#[tokio::test]
async fn test_remote_match_wins_and_uses_disambiguated_query() {
    let source = Arc::new(ScriptedFoodSource::empty().with_match(
        "banana raw",
        food_match(
            "Bananas, raw",
            &[(1008, 89.0), (1003, 1.09), (1005, 22.84), (1162, 8.7), (1092, 358.0)],
        ),
    ));
    let (resolver, counters) = with_source(Arc::clone(&source));

    let record = resolver.resolve("Banana", 120.0).await;

    assert_eq!(source.queries(), vec!["banana raw".to_owned()]);
    assert_eq!(record.source, NutrientSource::Remote);
    assert_eq!(record.food_name, "Banana");
    assert!((record.nutrients.calories - 106.8).abs() < 1e-9);
    assert!((record.nutrients.protein_g - 1.31).abs() < 1e-9);
    assert!((record.nutrients.micronutrients.vitamin_c - 10.44).abs() < 1e-9);
    assert!((record.nutrients.micronutrients.potassium - 429.6).abs() < 1e-9);
    assert!(record.nutrients.fat_g.abs() < f64::EPSILON);
    assert_eq!(counters.snapshot().remote_misses, 0);
}

#[tokio::test]
async fn test_remote_miss_degrades_to_local() {
    let source = Arc::new(ScriptedFoodSource::empty());
    let (resolver, counters) = with_source(Arc::clone(&source));

    let record = resolver.resolve("paneer", 100.0).await;

    assert_eq!(source.calls(), 1);
    assert_eq!(record.source, NutrientSource::Local);
    assert!((record.nutrients.calories - 265.0).abs() < 1e-9);
    assert_eq!(counters.snapshot().remote_misses, 1);
}

#[tokio::test]
async fn test_remote_failure_degrades_to_local() {
    let (resolver, counters) = with_source(Arc::new(ScriptedFoodSource::failing()));

    let record = resolver.resolve("dal", 150.0).await;

    assert_eq!(record.source, NutrientSource::Local);
    assert!((record.nutrients.calories - 174.0).abs() < 1e-9);
    assert_eq!(counters.snapshot().remote_misses, 1);
}

#[tokio::test]
async fn test_remote_failure_and_unknown_food_is_unresolved() {
    let (resolver, counters) = with_source(Arc::new(ScriptedFoodSource::failing()));

    let record = resolver.resolve("unobtainium_snack_42", 100.0).await;

    assert_eq!(record.source, NutrientSource::Unresolved);
    let stats = counters.snapshot();
    assert_eq!(stats.remote_misses, 1);
    assert_eq!(stats.unresolved_foods, 1);
}

#[tokio::test]
async fn test_slow_remote_is_bounded_by_timeout() {
    let source = Arc::new(
        ScriptedFoodSource::empty()
            .with_match("rice", food_match("Rice, white, cooked", &[(1008, 130.0)]))
            .with_delay(Duration::from_millis(500)),
    );
    let (resolver, _) = with_source(source);
    let resolver = resolver.with_remote_timeout(Duration::from_millis(30));

    let started = Instant::now();
    let record = resolver.resolve("rice", 100.0).await;

    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(record.source, NutrientSource::Local);
}

#[tokio::test]
async fn test_resolve_local_skips_remote() {
    let source = Arc::new(ScriptedFoodSource::empty());
    let (resolver, _) = with_source(Arc::clone(&source));

    let record = resolver.resolve_local("apple", 180.0);

    assert_eq!(record.source, NutrientSource::Local);
    assert_eq!(source.calls(), 0);
}
