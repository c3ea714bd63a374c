// ABOUTME: Aggregates a list of food quantities into per-item records and summed macro totals
// ABOUTME: Items resolve with bounded concurrency; output order and totals follow input order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::nutrient_resolver::NutrientSourceResolver;
use super::unit_converter::UnitConverter;
use crate::constants::meal::DEFAULT_CONCURRENCY;
use crate::errors::AppError;
use crate::models::{FoodQuantity, MacroTotals, MealItem, MealResult};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Which nutrient tiers a meal resolves through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Embedded table only; no remote calls
    #[default]
    LocalOnly,
    /// Remote source first, then the embedded table
    Tiered,
}

impl AggregationMode {
    /// Stable name used in configuration and logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LocalOnly => "local",
            Self::Tiered => "tiered",
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "local_only" | "local-only" => Ok(Self::LocalOnly),
            "tiered" | "full" => Ok(Self::Tiered),
            other => Err(AppError::invalid_input(format!(
                "Unknown meal resolution mode '{other}', expected 'local' or 'tiered'"
            ))),
        }
    }
}

/// Meal aggregation over a shared converter and resolver
pub struct MealAggregator {
    converter: Arc<UnitConverter>,
    resolver: Arc<NutrientSourceResolver>,
    concurrency: usize,
}

impl MealAggregator {
    /// Aggregator with the default concurrency bound
    #[must_use]
    pub fn new(converter: Arc<UnitConverter>, resolver: Arc<NutrientSourceResolver>) -> Self {
        Self {
            converter,
            resolver,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Max items resolved at once; zero is treated as one
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Configured concurrency bound
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolve every item and sum calories and macros
    ///
    /// Totals accumulate unrounded in input order and are rounded once.
    pub async fn aggregate(&self, items: &[FoodQuantity], mode: AggregationMode) -> MealResult {
        if items.is_empty() {
            return MealResult::default();
        }

        let resolved: Vec<MealItem> = stream::iter(items)
            .map(|item| self.resolve_item(item, mode))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut total = MacroTotals::default();
        for item in &resolved {
            total.accumulate(&item.record.nutrients);
        }

        debug!(
            items = resolved.len(),
            mode = %mode,
            calories = total.calories,
            "Aggregated meal"
        );

        MealResult {
            total: total.rounded(),
            items: resolved,
        }
    }

    async fn resolve_item(&self, item: &FoodQuantity, mode: AggregationMode) -> MealItem {
        let grams = self
            .converter
            .convert_grams(&item.name, item.quantity, &item.unit)
            .await;
        let record = match mode {
            AggregationMode::LocalOnly => self.resolver.resolve_local(&item.name, grams),
            AggregationMode::Tiered => self.resolver.resolve(&item.name, grams).await,
        };
        MealItem {
            quantity: item.quantity,
            unit: item.unit.clone(),
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_mode_parsing() {
        let parse = |raw: &str| raw.parse::<AggregationMode>().ok();
        assert_eq!(parse("local"), Some(AggregationMode::LocalOnly));
        assert_eq!(parse(" Local-Only "), Some(AggregationMode::LocalOnly));
        assert_eq!(parse("FULL"), Some(AggregationMode::Tiered));
        let err = "remote".parse::<AggregationMode>().err().map(|e| e.code);
        assert_eq!(err, Some(ErrorCode::InvalidInput));
    }

    #[test]
    fn test_default_mode_is_local() {
        assert_eq!(AggregationMode::default(), AggregationMode::LocalOnly);
    }
}
