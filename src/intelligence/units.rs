// ABOUTME: Deterministic unit tables: mass factors, household measures and per-food piece weights
// ABOUTME: Lookups normalize names and units and try singular forms before substring matches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Unit tables for food quantity conversion.
//!
//! Mass units convert exactly. Household measures and piece weights are
//! typical values and only used when no food-aware estimate is available.

// =============================================================================
// Mass units
// =============================================================================

/// Grams per ounce
pub const GRAMS_PER_OZ: f64 = 28.35;
/// Grams per pound
pub const GRAMS_PER_LB: f64 = 453.6;

/// Gram factor for a mass unit (already normalized), `None` for anything else
#[must_use]
pub fn mass_factor(unit: &str) -> Option<f64> {
    match unit {
        "g" | "gm" | "gms" | "gram" | "grams" => Some(1.0),
        "mg" | "milligram" | "milligrams" => Some(0.001),
        "kg" | "kgs" | "kilogram" | "kilograms" => Some(1000.0),
        "oz" | "ounce" | "ounces" => Some(GRAMS_PER_OZ),
        "lb" | "lbs" | "pound" | "pounds" => Some(GRAMS_PER_LB),
        _ => None,
    }
}

// =============================================================================
// Household measures
// =============================================================================

/// Typical grams per household measure (water-like density for ml)
#[must_use]
pub fn household_factor(unit: &str) -> Option<f64> {
    match unit {
        "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Some(1.0),
        "cup" | "cups" => Some(240.0),
        "glass" | "glasses" => Some(250.0),
        "katori" | "katoris" => Some(150.0),
        "bowl" | "bowls" => Some(250.0),
        "tsp" | "teaspoon" | "teaspoons" => Some(5.0),
        "tbsp" | "tablespoon" | "tablespoons" => Some(15.0),
        _ => None,
    }
}

/// Whether `unit` counts discrete items rather than measuring them
#[must_use]
pub fn is_count_unit(unit: &str) -> bool {
    matches!(
        unit,
        "piece" | "pieces" | "pc" | "pcs" | "each" | "unit" | "units" | "whole" | "item" | "items"
    )
}

// =============================================================================
// Piece weights
// =============================================================================

/// Average weight of one piece, in grams
const PIECE_WEIGHTS: &[(&str, f64)] = &[
    ("egg", 50.0),
    ("banana", 120.0),
    ("apple", 180.0),
    ("orange", 150.0),
    ("mango", 200.0),
    ("pear", 180.0),
    ("peach", 150.0),
    ("plum", 80.0),
    ("grape", 5.0),
    ("strawberry", 12.0),
    ("watermelon", 15000.0),
    ("carrot", 60.0),
    ("potato", 150.0),
    ("onion", 150.0),
    ("tomato", 120.0),
    ("roti", 30.0),
    ("chapati", 30.0),
    ("paratha", 50.0),
    ("bread", 30.0),
    ("slice", 30.0),
    ("cheese", 30.0),
    ("paneer", 50.0),
    ("chicken breast", 150.0),
    ("chicken", 150.0),
    ("fish", 150.0),
    ("rice", 200.0),
    ("dal", 250.0),
];

/// Lower-case and collapse internal whitespace
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Singular candidates for an English plural, most specific first
fn singular_forms(name: &str) -> Vec<String> {
    let mut forms = Vec::new();
    if let Some(stem) = name.strip_suffix("ies") {
        forms.push(format!("{stem}y"));
    }
    if let Some(stem) = name.strip_suffix("es") {
        forms.push(stem.to_owned());
    }
    if let Some(stem) = name.strip_suffix('s') {
        forms.push(stem.to_owned());
    }
    forms
}

fn exact_piece_weight(name: &str) -> Option<f64> {
    PIECE_WEIGHTS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, grams)| *grams)
}

/// Longest table key appearing as whole words inside `name`
fn contained_piece_weight(name: &str) -> Option<f64> {
    let padded = format!(" {name} ");
    PIECE_WEIGHTS
        .iter()
        .filter(|(key, _)| padded.contains(&format!(" {key} ")))
        .max_by_key(|(key, _)| key.len())
        .map(|(_, grams)| *grams)
}

/// Weight of one piece of `food`
///
/// Tries the exact name, then singular forms, then the longest table key
/// contained in the name (also after singularizing each word).
#[must_use]
pub fn piece_weight(food: &str) -> Option<f64> {
    let name = normalize_name(food);
    if name.is_empty() {
        return None;
    }

    if let Some(grams) = exact_piece_weight(&name) {
        return Some(grams);
    }
    if let Some(grams) = singular_forms(&name)
        .iter()
        .find_map(|form| exact_piece_weight(form))
    {
        return Some(grams);
    }

    if let Some(grams) = contained_piece_weight(&name) {
        return Some(grams);
    }
    let singular_words = name
        .split(' ')
        .map(|word| {
            singular_forms(word)
                .into_iter()
                .find(|form| exact_piece_weight(form).is_some())
                .unwrap_or_else(|| word.to_owned())
        })
        .collect::<Vec<_>>()
        .join(" ");
    contained_piece_weight(&singular_words)
}

/// Reference-table weight for `quantity unit` of `food`, if the tables cover it
///
/// `unit` must already be normalized.
#[must_use]
pub fn reference_grams(food: &str, quantity: f64, unit: &str) -> Option<f64> {
    if let Some(factor) = household_factor(unit) {
        return Some(quantity * factor);
    }
    if is_count_unit(unit) {
        return piece_weight(food).map(|grams| quantity * grams);
    }
    None
}
