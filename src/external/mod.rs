// ABOUTME: External food-composition search port and its USDA FoodData Central client
// ABOUTME: Search results carry per-100 g nutrient amounts addressed by numeric nutrient ID
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! External Food Composition Sources
//!
//! The resolver's remote tier talks to a [`FoodCompositionSource`]. The only
//! production implementation is [`UsdaClient`]; tests script their own.

pub mod usda_client;

use crate::errors::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use usda_client::{UsdaClient, UsdaClientConfig};

/// One nutrient amount from a search match (per 100 g)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodNutrient {
    /// Numeric nutrient ID (e.g., 1008 for energy)
    pub nutrient_id: u32,
    /// Amount per 100 g in the nutrient's native unit
    pub amount: f64,
}

/// Best match returned by a food-composition search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodMatch {
    /// Source-specific food identifier
    pub fdc_id: Option<u64>,
    /// Matched food description
    pub description: String,
    /// Dataset category (e.g., "Foundation", "SR Legacy")
    pub data_type: Option<String>,
    /// Nutrient amounts per 100 g
    pub nutrients: Vec<FoodNutrient>,
}

impl FoodMatch {
    /// Amount per 100 g for `nutrient_id`; absent IDs read as zero
    #[must_use]
    pub fn amount_per_100g(&self, nutrient_id: u32) -> f64 {
        self.nutrients
            .iter()
            .find(|n| n.nutrient_id == nutrient_id)
            .map_or(0.0, |n| n.amount)
    }
}

/// Food-composition search collaborator
#[async_trait]
pub trait FoodCompositionSource: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Return the best match for `query` within `dataset_filter`, if any
    ///
    /// # Errors
    ///
    /// Returns an external-service error for transport failures, timeouts and
    /// non-2xx responses. An empty result set is `Ok(None)`, not an error.
    async fn search(
        &self,
        query: &str,
        dataset_filter: &str,
        page_size: u32,
    ) -> AppResult<Option<FoodMatch>>;
}
