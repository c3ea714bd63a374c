// ABOUTME: Subcommand handlers for nutrition-cli
// ABOUTME: Each handler calls the engine and prints pretty JSON on stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use nutrition_engine::engine::NutritionEngine;
use nutrition_engine::intelligence::{AggregationMode, ConversionMethod};
use nutrition_engine::models::{FoodQuantity, NutrientIntake, NutrientRecord, UserProfile};
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct LookupOutput {
    grams: f64,
    conversion: ConversionMethod,
    #[serde(flatten)]
    record: NutrientRecord,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn log_stats(engine: &NutritionEngine) {
    let stats = engine.stats();
    debug!(
        conversion_fallbacks = stats.conversion_fallbacks,
        inference_calls = stats.inference_calls,
        remote_misses = stats.remote_misses,
        unresolved_foods = stats.unresolved_foods,
        "Engine stats"
    );
}

/// Convert then resolve one food through every tier
pub async fn lookup(engine: &NutritionEngine, food: &str, quantity: f64, unit: &str) -> Result<()> {
    let conversion = engine.convert_quantity(food, quantity, unit).await;
    let record = engine.resolver().resolve(food, conversion.grams).await;
    print_json(&LookupOutput {
        grams: conversion.grams,
        conversion: conversion.method,
        record,
    })?;
    log_stats(engine);
    Ok(())
}

/// Mode from flags, falling back to the configured default
pub fn meal_mode(engine: &NutritionEngine, tiered: bool, local: bool) -> AggregationMode {
    if tiered {
        AggregationMode::Tiered
    } else if local {
        AggregationMode::LocalOnly
    } else {
        engine.meal_mode()
    }
}

/// Aggregate a meal
pub async fn meal(
    engine: &NutritionEngine,
    items: &[FoodQuantity],
    mode: AggregationMode,
) -> Result<()> {
    let result = engine.calculate_meal_nutrition_with_mode(items, mode).await;
    print_json(&result)?;
    log_stats(engine);
    Ok(())
}

/// Score an intake
pub fn rda(engine: &NutritionEngine, profile: &UserProfile, intake: &NutrientIntake) -> Result<()> {
    print_json(&engine.calculate_rda(profile, intake))
}
