// ABOUTME: Integration tests for the tiered unit converter
// ABOUTME: Covers mass units, reference tables, heuristic fallback, inference caching and timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use common::CountingInference;
use nutrition_engine::cache::CacheConfig;
use nutrition_engine::intelligence::{ConversionMethod, ResolutionCounters, UnitConverter};
use std::sync::Arc;
use std::time::Duration;

mod common;

fn deterministic() -> (UnitConverter, Arc<ResolutionCounters>) {
    common::init_test_logging();
    let counters = Arc::new(ResolutionCounters::default());
    (UnitConverter::deterministic(Arc::clone(&counters)), counters)
}

fn with_inference(provider: Arc<CountingInference>) -> (UnitConverter, Arc<ResolutionCounters>) {
    common::init_test_logging();
    let counters = Arc::new(ResolutionCounters::default());
    let converter = UnitConverter::new(
        Some(provider),
        &CacheConfig::conversion_default(),
        Arc::clone(&counters),
    );
    (converter, counters)
}

// ============================================================================
// Deterministic tiers
// ============================================================================

#[tokio::test]
async fn test_cup_of_rice_uses_household_table() {
    let (converter, counters) = deterministic();
    let conversion = converter.convert("rice", 1.0, "cup").await;

    assert_eq!(conversion.method, ConversionMethod::ReferenceTable);
    assert!((conversion.grams - 240.0).abs() < f64::EPSILON);
    assert_eq!(counters.snapshot().conversion_fallbacks, 0);
}

#[tokio::test]
async fn test_two_eggs_use_piece_weight() {
    let (converter, _) = deterministic();
    let conversion = converter.convert("egg", 2.0, "piece").await;

    assert_eq!(conversion.method, ConversionMethod::ReferenceTable);
    assert!((conversion.grams - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_mass_units_are_exact_and_case_insensitive() {
    let (converter, _) = deterministic();
    let cases = [
        ("g", 250.0, 250.0),
        ("KG", 1.5, 1500.0),
        (" mg ", 500.0, 0.5),
        ("oz", 2.0, 56.7),
        ("lb", 1.0, 453.6),
    ];
    for (unit, quantity, expected) in cases {
        let conversion = converter.convert("chicken breast", quantity, unit).await;
        assert_eq!(conversion.method, ConversionMethod::MassUnit, "unit {unit}");
        assert!(
            (conversion.grams - expected).abs() < 1e-9,
            "{quantity} {unit} -> {} g",
            conversion.grams
        );
    }
}

#[tokio::test]
async fn test_gram_equivalent_units_scale_linearly() {
    let (converter, _) = deterministic();
    for unit in ["g", "kg", "oz", "lb", "cup", "tbsp"] {
        let single = converter.convert_grams("rice", 3.0, unit).await;
        let double = converter.convert_grams("rice", 6.0, unit).await;
        assert!((double - 2.0 * single).abs() < 1e-9, "unit {unit}");
    }
}

#[tokio::test]
async fn test_unknown_unit_falls_back_to_heuristic_and_counts() {
    let (converter, counters) = deterministic();
    let conversion = converter.convert("rice", 2.0, "handful").await;

    assert_eq!(conversion.method, ConversionMethod::Heuristic);
    assert!((conversion.grams - 200.0).abs() < f64::EPSILON);
    assert_eq!(counters.snapshot().conversion_fallbacks, 1);
}

#[tokio::test]
async fn test_piece_of_unknown_food_falls_back_to_heuristic() {
    let (converter, counters) = deterministic();
    let conversion = converter.convert("dragonfruit", 1.0, "piece").await;

    assert_eq!(conversion.method, ConversionMethod::Heuristic);
    assert!((conversion.grams - 100.0).abs() < f64::EPSILON);
    assert_eq!(counters.snapshot().conversion_fallbacks, 1);
}

#[tokio::test]
async fn test_overflowing_weight_is_treated_as_unusable_quantity() {
    let (converter, counters) = deterministic();
    let cases = [
        ("rice", 1e306, "kg"),
        ("rice", 1e306, "cup"),
        ("rice", 1e307, "handful"),
    ];

    for (food, quantity, unit) in cases {
        let conversion = converter.convert(food, quantity, unit).await;
        assert_eq!(conversion.method, ConversionMethod::ZeroQuantity, "{unit}");
        assert!(conversion.grams.abs() < f64::EPSILON, "{unit}");
    }
    assert_eq!(counters.snapshot().conversion_fallbacks, 3);
}

// ============================================================================
// Inference tier
// ============================================================================

#[tokio::test]
async fn test_inference_is_memoized_per_normalized_key() {
    let provider = Arc::new(CountingInference::returning(185.0));
    let (converter, counters) = with_inference(Arc::clone(&provider));

    let first = converter.convert("rice", 1.0, "cup").await;
    let second = converter.convert("  Rice ", 1.0, " CUP").await;

    assert_eq!(first.method, ConversionMethod::Inferred);
    assert_eq!(second.method, ConversionMethod::Cached);
    assert!((first.grams - 185.0).abs() < f64::EPSILON);
    assert!((second.grams - first.grams).abs() < f64::EPSILON);
    assert_eq!(provider.calls(), 1);
    assert_eq!(counters.snapshot().inference_calls, 1);
    assert_eq!(converter.cache_len().await, 1);
}

#[tokio::test]
async fn test_prompt_names_food_quantity_and_unit() {
    let provider = Arc::new(CountingInference::returning(70.0));
    let (converter, _) = with_inference(Arc::clone(&provider));

    converter.convert("duck egg", 1.0, "pcs").await;

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("duck egg"));
    assert!(prompts[0].contains("pcs"));
}

#[tokio::test]
async fn test_mass_units_never_call_inference() {
    let provider = Arc::new(CountingInference::returning(1.0));
    let (converter, _) = with_inference(Arc::clone(&provider));

    let conversion = converter.convert("rice", 100.0, "g").await;

    assert_eq!(conversion.method, ConversionMethod::MassUnit);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_zero_or_negative_quantity_never_calls_inference() {
    let provider = Arc::new(CountingInference::returning(1.0));
    let (converter, _) = with_inference(Arc::clone(&provider));

    for quantity in [0.0, -2.0] {
        let conversion = converter.convert("rice", quantity, "cup").await;
        assert_eq!(conversion.method, ConversionMethod::ZeroQuantity);
        assert!(conversion.grams.abs() < f64::EPSILON);
    }
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_failed_inference_falls_back_and_is_not_cached() {
    let provider = Arc::new(CountingInference::failing());
    let (converter, counters) = with_inference(Arc::clone(&provider));

    let first = converter.convert("rice", 1.0, "cup").await;
    let second = converter.convert("rice", 1.0, "cup").await;

    assert_eq!(first.method, ConversionMethod::ReferenceTable);
    assert!((first.grams - 240.0).abs() < f64::EPSILON);
    assert_eq!(second.method, ConversionMethod::ReferenceTable);
    // failures do not poison the key: the second call retries
    assert_eq!(provider.calls(), 2);
    assert_eq!(converter.cache_len().await, 0);
    assert_eq!(counters.snapshot().conversion_fallbacks, 0);
}

#[tokio::test]
async fn test_negative_inferred_weight_is_rejected() {
    let provider = Arc::new(CountingInference::returning(-5.0));
    let (converter, counters) = with_inference(Arc::clone(&provider));

    let conversion = converter.convert("mystery stew", 1.0, "ladle").await;

    assert_eq!(conversion.method, ConversionMethod::Heuristic);
    assert!((conversion.grams - 100.0).abs() < f64::EPSILON);
    assert_eq!(counters.snapshot().conversion_fallbacks, 1);
}

#[tokio::test]
async fn test_slow_inference_times_out_into_fallback() {
    let provider =
        Arc::new(CountingInference::returning(185.0).with_delay(Duration::from_millis(500)));
    let (converter, _) = with_inference(Arc::clone(&provider));
    let converter = converter.with_inference_timeout(Duration::from_millis(20));

    let started = std::time::Instant::now();
    let conversion = converter.convert("rice", 1.0, "cup").await;

    assert_eq!(conversion.method, ConversionMethod::ReferenceTable);
    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(converter.cache_len().await, 0);
}

#[tokio::test]
async fn test_concurrent_misses_share_one_inference_call() {
    let provider =
        Arc::new(CountingInference::returning(150.0).with_delay(Duration::from_millis(50)));
    let (converter, _) = with_inference(Arc::clone(&provider));
    let converter = Arc::new(converter);

    let handles = (0..8)
        .map(|_| {
            let converter = Arc::clone(&converter);
            tokio::spawn(async move { converter.convert("dal", 1.0, "katori").await })
        })
        .collect::<Vec<_>>();

    let results = futures_util::future::join_all(handles).await;
    let conversions = results.into_iter().map(Result::unwrap).collect::<Vec<_>>();

    assert_eq!(provider.calls(), 1);
    assert!(conversions
        .iter()
        .all(|c| (c.grams - 150.0).abs() < f64::EPSILON));
    assert_eq!(
        conversions
            .iter()
            .filter(|c| c.method == ConversionMethod::Inferred)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_invalidate_forces_a_fresh_inference() {
    let provider = Arc::new(CountingInference::returning(30.0));
    let (converter, _) = with_inference(Arc::clone(&provider));

    converter.convert("roti", 1.0, "piece").await;
    assert!(converter.invalidate("Roti", 1.0, "PIECE").await);
    assert!(!converter.invalidate("roti", 1.0, "piece").await);

    let again = converter.convert("roti", 1.0, "piece").await;
    assert_eq!(again.method, ConversionMethod::Inferred);
    assert_eq!(provider.calls(), 2);

    converter.clear_cache().await;
    assert_eq!(converter.cache_len().await, 0);
}
