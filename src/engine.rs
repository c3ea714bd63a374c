// ABOUTME: NutritionEngine facade wiring the converter, resolver, aggregator and evaluator together
// ABOUTME: Exposes the total operations: food lookup, meal nutrition, RDA scoring and stats
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Engine
//!
//! The single entry point callers hold. Every operation is total: collaborator
//! failures degrade to the next tier and show up in [`NutritionEngine::stats`],
//! never as an error.
//!
//! ```rust,no_run
//! use nutrition_engine::config::EngineConfig;
//! use nutrition_engine::engine::NutritionEngine;
//! use nutrition_engine::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let engine = NutritionEngine::from_config(&EngineConfig::from_env()?)?;
//!     let record = engine.lookup_food("rice", 1.0, "cup").await;
//!     println!("{} kcal", record.nutrients.calories);
//!     Ok(())
//! }
//! ```

use crate::config::EngineConfig;
use crate::errors::AppResult;
use crate::external::{FoodCompositionSource, UsdaClient, UsdaClientConfig};
use crate::intelligence::{
    AggregationMode, AllowanceTable, Conversion, EngineStats, MealAggregator,
    NutrientSourceResolver, RdaEvaluator, RdaResult, ResolutionCounters, UnitConverter,
};
use crate::llm::{
    LlmUnitInference, OpenAiCompatibleConfig, OpenAiCompatibleGenerator, UnitInferenceProvider,
};
use crate::models::{FoodQuantity, MealResult, NutrientIntake, NutrientRecord, UserProfile};
use std::sync::Arc;
use tracing::info;

/// Food resolution, meal aggregation and RDA scoring behind one handle
pub struct NutritionEngine {
    converter: Arc<UnitConverter>,
    resolver: Arc<NutrientSourceResolver>,
    aggregator: MealAggregator,
    evaluator: RdaEvaluator,
    meal_mode: AggregationMode,
    counters: Arc<ResolutionCounters>,
}

impl NutritionEngine {
    /// Engine with the collaborators the configuration enables
    ///
    /// A missing `USDA_API_KEY` or `LOCAL_LLM_BASE_URL` omits that tier.
    ///
    /// # Errors
    ///
    /// Returns an error if an enabled collaborator's HTTP client cannot be created
    pub fn from_config(config: &EngineConfig) -> AppResult<Self> {
        let mut builder = Self::builder().with_config(config.clone());

        if let Some(usda) = UsdaClientConfig::from_usda_config(&config.usda) {
            builder = builder.with_remote_source(Arc::new(UsdaClient::new(usda)?));
        }

        if let Some(llm) = OpenAiCompatibleConfig::from_inference_config(&config.inference) {
            let generator = OpenAiCompatibleGenerator::new(llm)?;
            let inference = LlmUnitInference::new(Arc::new(generator))
                .with_model(config.inference.model.clone());
            builder = builder.with_inference(Arc::new(inference));
        }

        Ok(builder.build())
    }

    /// Builder for injecting collaborators directly
    #[must_use]
    pub fn builder() -> NutritionEngineBuilder {
        NutritionEngineBuilder::new()
    }

    /// Resolve one food quantity through every tier
    pub async fn lookup_food(&self, food_name: &str, quantity: f64, unit: &str) -> NutrientRecord {
        let grams = self.converter.convert_grams(food_name, quantity, unit).await;
        self.resolver.resolve(food_name, grams).await
    }

    /// Convert a quantity to grams, reporting which tier answered
    pub async fn convert_quantity(&self, food_name: &str, quantity: f64, unit: &str) -> Conversion {
        self.converter.convert(food_name, quantity, unit).await
    }

    /// Score an intake against the allowance table
    #[must_use]
    pub fn calculate_rda(&self, profile: &UserProfile, intake: &NutrientIntake) -> RdaResult {
        self.evaluator.evaluate(profile, intake)
    }

    /// Aggregate a meal in the configured default mode
    pub async fn calculate_meal_nutrition(&self, items: &[FoodQuantity]) -> MealResult {
        self.aggregator.aggregate(items, self.meal_mode).await
    }

    /// Aggregate a meal in an explicit mode
    pub async fn calculate_meal_nutrition_with_mode(
        &self,
        items: &[FoodQuantity],
        mode: AggregationMode,
    ) -> MealResult {
        self.aggregator.aggregate(items, mode).await
    }

    /// Default meal mode
    #[must_use]
    pub const fn meal_mode(&self) -> AggregationMode {
        self.meal_mode
    }

    /// Degradation counters since construction
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.counters.snapshot()
    }

    /// Shared unit converter
    #[must_use]
    pub fn converter(&self) -> &Arc<UnitConverter> {
        &self.converter
    }

    /// Shared nutrient resolver
    #[must_use]
    pub fn resolver(&self) -> &Arc<NutrientSourceResolver> {
        &self.resolver
    }
}

/// Assembles a [`NutritionEngine`] from configuration and optional collaborators
pub struct NutritionEngineBuilder {
    config: EngineConfig,
    inference: Option<Arc<dyn UnitInferenceProvider>>,
    remote: Option<Arc<dyn FoodCompositionSource>>,
    allowances: Option<Arc<dyn AllowanceTable>>,
}

impl NutritionEngineBuilder {
    /// Default configuration, no collaborators
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            inference: None,
            remote: None,
            allowances: None,
        }
    }

    /// Timeouts, cache sizing, meal mode and threshold
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable the unit-inference tier
    #[must_use]
    pub fn with_inference(mut self, inference: Arc<dyn UnitInferenceProvider>) -> Self {
        self.inference = Some(inference);
        self
    }

    /// Enable the remote nutrient tier
    #[must_use]
    pub fn with_remote_source(mut self, remote: Arc<dyn FoodCompositionSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Replace the standard allowance table
    #[must_use]
    pub fn with_allowance_table(mut self, table: Arc<dyn AllowanceTable>) -> Self {
        self.allowances = Some(table);
        self
    }

    /// Build the engine
    #[must_use]
    pub fn build(self) -> NutritionEngine {
        let config = self.config;
        let counters = Arc::new(ResolutionCounters::default());

        info!(
            inference = self.inference.is_some(),
            remote = self.remote.is_some(),
            meal_mode = %config.meal_mode,
            meal_concurrency = config.meal_concurrency,
            "Building nutrition engine"
        );

        let converter = Arc::new(
            UnitConverter::new(self.inference, &config.conversion_cache, Arc::clone(&counters))
                .with_inference_timeout(config.inference.timeout),
        );
        let resolver = Arc::new(
            NutrientSourceResolver::new(self.remote, Arc::clone(&counters))
                .with_remote_timeout(config.usda.timeout),
        );
        let aggregator = MealAggregator::new(Arc::clone(&converter), Arc::clone(&resolver))
            .with_concurrency(config.meal_concurrency);

        let mut evaluator = RdaEvaluator::new().with_threshold(config.deficiency_threshold_percent);
        if let Some(table) = self.allowances {
            evaluator = evaluator.with_table(table);
        }

        NutritionEngine {
            converter,
            resolver,
            aggregator,
            evaluator,
            meal_mode: config.meal_mode,
            counters,
        }
    }
}

impl Default for NutritionEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
