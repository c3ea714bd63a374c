// ABOUTME: Embedded per-100 g reference table used when the remote nutrient source has no answer
// ABOUTME: Ordered slice so substring matching is deterministic: exact name first, then table order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::units::normalize_name;
use crate::models::{Micronutrients, NutrientVector};

/// Macronutrients of one reference food, per 100 g
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFood {
    /// Lower-case lookup key
    pub name: &'static str,
    /// Energy (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein_g: f64,
    /// Carbohydrate (g)
    pub carbs_g: f64,
    /// Total fat (g)
    pub fat_g: f64,
    /// Dietary fiber (g)
    pub fiber_g: f64,
}

impl LocalFood {
    const fn new(
        name: &'static str,
        calories: f64,
        protein_g: f64,
        carbs_g: f64,
        fat_g: f64,
        fiber_g: f64,
    ) -> Self {
        Self {
            name,
            calories,
            protein_g,
            carbs_g,
            fat_g,
            fiber_g,
        }
    }

    /// Per-100 g vector; micronutrients are not tracked locally and read as zero
    #[must_use]
    pub fn per_100g(&self) -> NutrientVector {
        NutrientVector {
            calories: self.calories,
            protein_g: self.protein_g,
            carbs_g: self.carbs_g,
            fat_g: self.fat_g,
            fiber_g: self.fiber_g,
            micronutrients: Micronutrients::default(),
        }
    }
}

/// Reference foods in match-priority order
pub const LOCAL_FOODS: &[LocalFood] = &[
    LocalFood::new("rice", 130.0, 2.7, 28.0, 0.3, 0.4),
    LocalFood::new("chicken breast", 165.0, 31.0, 0.0, 3.6, 0.0),
    LocalFood::new("egg", 155.0, 13.0, 1.1, 11.0, 0.0),
    LocalFood::new("apple", 52.0, 0.3, 14.0, 0.2, 2.4),
    LocalFood::new("banana", 89.0, 1.1, 23.0, 0.3, 2.6),
    LocalFood::new("milk", 42.0, 3.4, 5.0, 1.0, 0.0),
    LocalFood::new("bread", 265.0, 9.0, 49.0, 3.2, 2.7),
    LocalFood::new("dal", 116.0, 9.0, 20.0, 0.4, 7.9),
    LocalFood::new("roti", 264.0, 8.5, 52.0, 2.1, 4.4),
    LocalFood::new("paneer", 265.0, 18.0, 1.2, 21.0, 0.0),
];

/// Find a reference food for `food_name`
///
/// Exact normalized match wins. Otherwise the first entry, in table order,
/// whose key contains the name or is contained by it. Blank names never match.
#[must_use]
pub fn find_local_food(food_name: &str) -> Option<&'static LocalFood> {
    let name = normalize_name(food_name);
    if name.is_empty() {
        return None;
    }

    LOCAL_FOODS
        .iter()
        .find(|food| food.name == name)
        .or_else(|| {
            LOCAL_FOODS
                .iter()
                .find(|food| name.contains(food.name) || food.name.contains(name.as_str()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_normalized() {
        assert_eq!(find_local_food(" EGG ").map(|f| f.name), Some("egg"));
    }

    #[test]
    fn test_substring_match_uses_table_order() {
        // contains both "rice" and "egg"; "rice" is earlier
        assert_eq!(find_local_food("egg fried rice").map(|f| f.name), Some("rice"));
        assert_eq!(find_local_food("chicken").map(|f| f.name), Some("chicken breast"));
        assert_eq!(find_local_food("toor dal").map(|f| f.name), Some("dal"));
    }

    #[test]
    fn test_blank_and_unknown_names() {
        assert!(find_local_food("").is_none());
        assert!(find_local_food("unobtainium_snack_42").is_none());
    }
}
