// ABOUTME: Resolves (food, grams) to a nutrient record via remote search, local table, or unresolved
// ABOUTME: Remote failures of any kind degrade to the local tier and are never surfaced to callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrient Source Resolver
//!
//! Tiers, first match wins:
//!
//! 1. **Remote**: a [`FoodCompositionSource`] queried with a disambiguated
//!    name, restricted to trusted datasets, best match only. Nutrients are read
//!    by numeric ID from [`NUTRIENT_IDS`].
//! 2. **Local**: the embedded table in [`super::local_foods`].
//! 3. **Unresolved**: zero-filled record with `error` set.
//!
//! Every tier scales per-100 g amounts by `grams / 100` and rounds with the
//! shared nutrient precision.

use super::local_foods::find_local_food;
use super::ResolutionCounters;
use crate::constants::{timeouts, usda};
use crate::external::{FoodCompositionSource, FoodMatch};
use crate::models::{Micronutrient, NutrientRecord, NutrientSource, NutrientVector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Error text carried by unresolved records
pub const UNRESOLVED_ERROR: &str = "Food not found in database";

/// A slot in [`NutrientVector`] addressed by a numeric nutrient ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientField {
    /// Energy (kcal)
    Calories,
    /// Protein (g)
    Protein,
    /// Total fat (g)
    Fat,
    /// Carbohydrate (g)
    Carbohydrates,
    /// Dietary fiber (g)
    Fiber,
    /// One of the tracked micronutrients
    Micro(Micronutrient),
}

/// Numeric nutrient IDs of the food-composition service
pub const NUTRIENT_IDS: [(NutrientField, u32); 20] = [
    (NutrientField::Calories, 1008),
    (NutrientField::Protein, 1003),
    (NutrientField::Fat, 1004),
    (NutrientField::Carbohydrates, 1005),
    (NutrientField::Fiber, 1079),
    (NutrientField::Micro(Micronutrient::VitaminC), 1162),
    (NutrientField::Micro(Micronutrient::Iron), 1089),
    (NutrientField::Micro(Micronutrient::Calcium), 1087),
    (NutrientField::Micro(Micronutrient::VitaminD), 1094),
    (NutrientField::Micro(Micronutrient::VitaminA), 1104),
    (NutrientField::Micro(Micronutrient::VitaminB12), 1095),
    (NutrientField::Micro(Micronutrient::VitaminB6), 1096),
    (NutrientField::Micro(Micronutrient::Folate), 1177),
    (NutrientField::Micro(Micronutrient::Magnesium), 1090),
    (NutrientField::Micro(Micronutrient::Potassium), 1092),
    (NutrientField::Micro(Micronutrient::Zinc), 1093),
    (NutrientField::Micro(Micronutrient::Selenium), 1103),
    (NutrientField::Micro(Micronutrient::Copper), 1098),
    (NutrientField::Micro(Micronutrient::Manganese), 1101),
    (NutrientField::Micro(Micronutrient::Iodine), 1100),
];

/// Read a search match into a per-100 g vector; absent IDs stay zero
#[must_use]
pub fn vector_from_match(food: &FoodMatch) -> NutrientVector {
    let mut vector = NutrientVector::zero();
    for (field, id) in NUTRIENT_IDS {
        let amount = food.amount_per_100g(id);
        match field {
            NutrientField::Calories => vector.calories = amount,
            NutrientField::Protein => vector.protein_g = amount,
            NutrientField::Fat => vector.fat_g = amount,
            NutrientField::Carbohydrates => vector.carbs_g = amount,
            NutrientField::Fiber => vector.fiber_g = amount,
            NutrientField::Micro(m) => *vector.micronutrients.slot_mut(m) = amount,
        }
    }
    vector
}

/// Bias generic names toward raw, whole forms over processed variants
#[must_use]
pub fn search_query_for(food_name: &str) -> String {
    let normalized = food_name.trim().to_lowercase();
    match normalized.as_str() {
        "egg" => "egg whole raw".to_owned(),
        "banana" => "banana raw".to_owned(),
        "apple" => "apple raw".to_owned(),
        _ => food_name.trim().to_owned(),
    }
}

/// Tiered nutrient resolver
pub struct NutrientSourceResolver {
    remote: Option<Arc<dyn FoodCompositionSource>>,
    remote_timeout: Duration,
    counters: Arc<ResolutionCounters>,
}

impl NutrientSourceResolver {
    /// Resolver with an optional remote tier
    #[must_use]
    pub fn new(
        remote: Option<Arc<dyn FoodCompositionSource>>,
        counters: Arc<ResolutionCounters>,
    ) -> Self {
        Self {
            remote,
            remote_timeout: Duration::from_secs(timeouts::USDA_REQUEST_TIMEOUT_SECS),
            counters,
        }
    }

    /// Outer bound on one remote lookup
    #[must_use]
    pub const fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Whether the remote tier is wired
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Resolve through every tier
    pub async fn resolve(&self, food_name: &str, grams: f64) -> NutrientRecord {
        let grams = sanitize_grams(grams);
        if let Some(record) = self.resolve_remote(food_name, grams).await {
            return record;
        }
        self.resolve_local(food_name, grams)
    }

    /// Resolve against the embedded table only
    #[must_use]
    pub fn resolve_local(&self, food_name: &str, grams: f64) -> NutrientRecord {
        let grams = sanitize_grams(grams);
        if let Some(food) = find_local_food(food_name) {
            debug!(food = food_name, matched = food.name, grams, tier = "local", "Resolved food");
            return NutrientRecord::resolved(
                food_name,
                grams,
                NutrientSource::Local,
                food.per_100g().scaled_to_grams(grams),
            );
        }

        self.counters.record_unresolved();
        info!(food = food_name, grams, tier = "unresolved", "No nutrient source matched food");
        NutrientRecord::unresolved(food_name, grams, UNRESOLVED_ERROR)
    }

    async fn resolve_remote(&self, food_name: &str, grams: f64) -> Option<NutrientRecord> {
        let Some(remote) = &self.remote else {
            debug!(food = food_name, "No remote nutrient source configured");
            return None;
        };

        let query = search_query_for(food_name);
        let search = remote.search(&query, usda::TRUSTED_DATA_TYPES, usda::BEST_MATCH_PAGE_SIZE);
        let outcome = tokio::time::timeout(self.remote_timeout, search).await;

        let miss_reason = match outcome {
            Ok(Ok(Some(found))) => {
                debug!(
                    food = food_name,
                    query = %query,
                    matched = %found.description,
                    grams,
                    tier = "remote",
                    "Resolved food"
                );
                return Some(NutrientRecord::resolved(
                    food_name,
                    grams,
                    NutrientSource::Remote,
                    vector_from_match(&found).scaled_to_grams(grams),
                ));
            }
            Ok(Ok(None)) => "no match".to_owned(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}ms", self.remote_timeout.as_millis()),
        };

        self.counters.record_remote_miss();
        warn!(
            food = food_name,
            query = %query,
            source = remote.name(),
            reason = %miss_reason,
            "Remote nutrient lookup missed; using local table"
        );
        None
    }
}

/// Weights that are negative or not finite resolve as zero
fn sanitize_grams(grams: f64) -> f64 {
    if grams.is_finite() && grams > 0.0 {
        grams
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::FoodNutrient;

    #[test]
    fn test_query_rewrites_only_exact_generic_names() {
        assert_eq!(search_query_for("Egg"), "egg whole raw");
        assert_eq!(search_query_for("banana"), "banana raw");
        assert_eq!(search_query_for("apple pie"), "apple pie");
    }

    #[test]
    fn test_vector_from_match_maps_ids_and_zero_fills() {
        let found = FoodMatch {
            fdc_id: Some(1),
            description: "Bananas, raw".to_owned(),
            data_type: Some("SR Legacy".to_owned()),
            nutrients: vec![
                FoodNutrient {
                    nutrient_id: 1008,
                    amount: 89.0,
                },
                FoodNutrient {
                    nutrient_id: 1005,
                    amount: 22.8,
                },
                FoodNutrient {
                    nutrient_id: 1092,
                    amount: 358.0,
                },
                FoodNutrient {
                    nutrient_id: 9999,
                    amount: 1.0,
                },
            ],
        };
        let vector = vector_from_match(&found);
        assert!((vector.calories - 89.0).abs() < f64::EPSILON);
        assert!((vector.carbs_g - 22.8).abs() < f64::EPSILON);
        assert!((vector.micronutrients.potassium - 358.0).abs() < f64::EPSILON);
        assert!(vector.protein_g.abs() < f64::EPSILON);
        assert!(vector.micronutrients.iodine.abs() < f64::EPSILON);
    }

    #[test]
    fn test_nutrient_id_table_covers_every_micronutrient() {
        for nutrient in Micronutrient::ALL {
            assert!(NUTRIENT_IDS
                .iter()
                .any(|(field, _)| *field == NutrientField::Micro(nutrient)));
        }
    }
}
