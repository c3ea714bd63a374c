// ABOUTME: Library entry point for the nutrition resolution engine
// ABOUTME: Food quantity conversion, nutrient lookup, meal aggregation and RDA scoring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutrition Engine
//!
//! Resolves free-form food quantities ("1 cup rice", "2 pcs egg") into
//! nutrient records, aggregates meals and scores intake against recommended
//! daily allowances.
//!
//! ## Architecture
//!
//! - **Unit conversion**: mass units, cached food-aware inference, household
//!   and piece-weight tables, then a logged ×100 heuristic
//! - **Nutrient resolution**: remote food-composition search, embedded local
//!   table, then an explicit unresolved record
//! - **Meal aggregation**: bounded-concurrency resolution with totals rounded once
//! - **RDA scoring**: percentage of allowance plus a threshold-based deficiency list
//!
//! Every exposed operation is total; collaborator failures degrade to the next
//! tier and are logged and counted.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use nutrition_engine::engine::NutritionEngine;
//! use nutrition_engine::models::FoodQuantity;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = NutritionEngine::builder().build();
//!     let meal = engine
//!         .calculate_meal_nutrition(&[
//!             FoodQuantity::new("rice", 1.0, "cup"),
//!             FoodQuantity::new("chicken breast", 150.0, "g"),
//!         ])
//!         .await;
//!     println!("{} kcal", meal.total.calories);
//! }
//! ```

/// Bounded TTL caches with single-flight loading
pub mod cache;

/// Environment-based engine configuration
pub mod config;

/// Tunable defaults
pub mod constants;

/// Engine facade
pub mod engine;

/// Unified error handling with standard error codes
pub mod errors;

/// External food-composition clients (USDA)
pub mod external;

/// Conversion, resolution, aggregation and scoring pipeline
pub mod intelligence;

/// Text-generation port and unit inference
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Shared data models and rounding policy
pub mod models;

pub use engine::{NutritionEngine, NutritionEngineBuilder};
pub use errors::{AppError, AppResult, ErrorCode};
