// ABOUTME: Core data model for food quantities, nutrient vectors, records, meals and RDA inputs
// ABOUTME: Owns the shared rounding policy so every resolution tier rounds identically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Data Model
//!
//! Nutrient amounts are per resolved weight, not per 100 g, once they leave the
//! resolver. The micronutrient set is fixed at compile time by
//! [`Micronutrients`], so every record carries the same fifteen keys no matter
//! which tier produced it.

use crate::constants::rounding::NUTRIENT_DECIMALS;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Round `value` to `decimals` places, half away from zero
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round a nutrient amount with the engine-wide precision
#[must_use]
pub fn round_nutrient(value: f64) -> f64 {
    round_to(value, NUTRIENT_DECIMALS)
}

// ============================================================================
// Input
// ============================================================================

/// A user-supplied food quantity such as "1 cup rice"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodQuantity {
    /// Food name as typed by the user
    #[serde(alias = "food_name")]
    pub name: String,
    /// Amount in `unit`
    pub quantity: f64,
    /// Unit of measurement, case-insensitive
    pub unit: String,
}

impl FoodQuantity {
    /// Create a new food quantity
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }

    /// Boundary validation for callers that accept untrusted input
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty name or a non-positive/non-finite quantity
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input("Food name cannot be empty"));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(AppError::invalid_input(format!(
                "Quantity for '{}' must be a positive number",
                self.name
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Nutrient vectors
// ============================================================================

/// The fixed set of tracked vitamins and minerals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Micronutrient {
    /// Vitamin C (mg)
    VitaminC,
    /// Iron (mg)
    Iron,
    /// Calcium (mg)
    Calcium,
    /// Vitamin D (µg)
    VitaminD,
    /// Vitamin A (µg RAE)
    VitaminA,
    /// Vitamin B12 (µg)
    VitaminB12,
    /// Vitamin B6 (mg)
    VitaminB6,
    /// Folate (µg DFE)
    Folate,
    /// Magnesium (mg)
    Magnesium,
    /// Potassium (mg)
    Potassium,
    /// Zinc (mg)
    Zinc,
    /// Selenium (µg)
    Selenium,
    /// Copper (mg)
    Copper,
    /// Manganese (mg)
    Manganese,
    /// Iodine (µg)
    Iodine,
}

impl Micronutrient {
    /// Every micronutrient, in reporting order
    pub const ALL: [Self; 15] = [
        Self::VitaminC,
        Self::Iron,
        Self::Calcium,
        Self::VitaminD,
        Self::VitaminA,
        Self::VitaminB12,
        Self::VitaminB6,
        Self::Folate,
        Self::Magnesium,
        Self::Potassium,
        Self::Zinc,
        Self::Selenium,
        Self::Copper,
        Self::Manganese,
        Self::Iodine,
    ];

    /// Stable key used in serialized maps
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::VitaminC => "vitamin_c",
            Self::Iron => "iron",
            Self::Calcium => "calcium",
            Self::VitaminD => "vitamin_d",
            Self::VitaminA => "vitamin_a",
            Self::VitaminB12 => "vitamin_b12",
            Self::VitaminB6 => "vitamin_b6",
            Self::Folate => "folate",
            Self::Magnesium => "magnesium",
            Self::Potassium => "potassium",
            Self::Zinc => "zinc",
            Self::Selenium => "selenium",
            Self::Copper => "copper",
            Self::Manganese => "manganese",
            Self::Iodine => "iodine",
        }
    }
}

impl fmt::Display for Micronutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Micronutrient amounts; every key is always present (zero when unknown)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Micronutrients {
    /// Vitamin C (mg)
    pub vitamin_c: f64,
    /// Iron (mg)
    pub iron: f64,
    /// Calcium (mg)
    pub calcium: f64,
    /// Vitamin D (µg)
    pub vitamin_d: f64,
    /// Vitamin A (µg RAE)
    pub vitamin_a: f64,
    /// Vitamin B12 (µg)
    pub vitamin_b12: f64,
    /// Vitamin B6 (mg)
    pub vitamin_b6: f64,
    /// Folate (µg DFE)
    pub folate: f64,
    /// Magnesium (mg)
    pub magnesium: f64,
    /// Potassium (mg)
    pub potassium: f64,
    /// Zinc (mg)
    pub zinc: f64,
    /// Selenium (µg)
    pub selenium: f64,
    /// Copper (mg)
    pub copper: f64,
    /// Manganese (mg)
    pub manganese: f64,
    /// Iodine (µg)
    pub iodine: f64,
}

impl Micronutrients {
    /// Amount of one micronutrient
    #[must_use]
    pub const fn get(&self, nutrient: Micronutrient) -> f64 {
        match nutrient {
            Micronutrient::VitaminC => self.vitamin_c,
            Micronutrient::Iron => self.iron,
            Micronutrient::Calcium => self.calcium,
            Micronutrient::VitaminD => self.vitamin_d,
            Micronutrient::VitaminA => self.vitamin_a,
            Micronutrient::VitaminB12 => self.vitamin_b12,
            Micronutrient::VitaminB6 => self.vitamin_b6,
            Micronutrient::Folate => self.folate,
            Micronutrient::Magnesium => self.magnesium,
            Micronutrient::Potassium => self.potassium,
            Micronutrient::Zinc => self.zinc,
            Micronutrient::Selenium => self.selenium,
            Micronutrient::Copper => self.copper,
            Micronutrient::Manganese => self.manganese,
            Micronutrient::Iodine => self.iodine,
        }
    }

    /// Mutable slot for one micronutrient
    pub fn slot_mut(&mut self, nutrient: Micronutrient) -> &mut f64 {
        match nutrient {
            Micronutrient::VitaminC => &mut self.vitamin_c,
            Micronutrient::Iron => &mut self.iron,
            Micronutrient::Calcium => &mut self.calcium,
            Micronutrient::VitaminD => &mut self.vitamin_d,
            Micronutrient::VitaminA => &mut self.vitamin_a,
            Micronutrient::VitaminB12 => &mut self.vitamin_b12,
            Micronutrient::VitaminB6 => &mut self.vitamin_b6,
            Micronutrient::Folate => &mut self.folate,
            Micronutrient::Magnesium => &mut self.magnesium,
            Micronutrient::Potassium => &mut self.potassium,
            Micronutrient::Zinc => &mut self.zinc,
            Micronutrient::Selenium => &mut self.selenium,
            Micronutrient::Copper => &mut self.copper,
            Micronutrient::Manganese => &mut self.manganese,
            Micronutrient::Iodine => &mut self.iodine,
        }
    }

    /// Iterate `(nutrient, amount)` pairs in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (Micronutrient, f64)> + '_ {
        Micronutrient::ALL.into_iter().map(|m| (m, self.get(m)))
    }

    /// Apply `f` to every amount
    #[must_use]
    pub fn map(mut self, f: impl Fn(f64) -> f64) -> Self {
        for nutrient in Micronutrient::ALL {
            let slot = self.slot_mut(nutrient);
            *slot = f(*slot);
        }
        self
    }
}

/// Macro- and micronutrient amounts for a food at a given weight
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientVector {
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
    /// Vitamins and minerals
    pub micronutrients: Micronutrients,
}

impl NutrientVector {
    /// All-zero vector
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale per-100 g amounts to `grams` and round with the shared policy
    #[must_use]
    pub fn scaled_to_grams(&self, grams: f64) -> Self {
        let factor = grams / 100.0;
        let scale = |v: f64| round_nutrient(v * factor);
        Self {
            calories: scale(self.calories),
            protein_g: scale(self.protein_g),
            carbs_g: scale(self.carbs_g),
            fat_g: scale(self.fat_g),
            fiber_g: scale(self.fiber_g),
            micronutrients: self.micronutrients.map(scale),
        }
    }
}

// ============================================================================
// Resolution results
// ============================================================================

/// Which tier produced a nutrient record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientSource {
    /// External food-composition search service
    Remote,
    /// Embedded reference table
    Local,
    /// No tier produced a match
    Unresolved,
}

impl NutrientSource {
    /// Lower-case name used in logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
            Self::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for NutrientSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nutrients for one food at one weight, tagged with the tier that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientRecord {
    /// Food name as requested
    pub food_name: String,
    /// Weight the amounts refer to, e.g. "240g"
    #[serde(rename = "serving")]
    pub serving_label: String,
    /// Producing tier
    pub source: NutrientSource,
    /// Scaled, rounded amounts
    #[serde(flatten)]
    pub nutrients: NutrientVector,
    /// Set only for unresolved foods
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl NutrientRecord {
    /// Record for a food some tier resolved
    #[must_use]
    pub fn resolved(
        food_name: impl Into<String>,
        grams: f64,
        source: NutrientSource,
        nutrients: NutrientVector,
    ) -> Self {
        Self {
            food_name: food_name.into(),
            serving_label: serving_label(grams),
            source,
            nutrients,
            error: None,
        }
    }

    /// Zero-filled record for a food no tier could resolve
    #[must_use]
    pub fn unresolved(food_name: impl Into<String>, grams: f64, error: impl Into<String>) -> Self {
        Self {
            food_name: food_name.into(),
            serving_label: serving_label(grams),
            source: NutrientSource::Unresolved,
            nutrients: NutrientVector::zero(),
            error: Some(error.into()),
        }
    }

    /// Whether a tier produced real data for this record
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.source != NutrientSource::Unresolved
    }
}

fn serving_label(grams: f64) -> String {
    format!("{}g", round_nutrient(grams))
}

/// Summed macronutrients for a meal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
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

impl MacroTotals {
    /// Add one item's macros to the running (unrounded) sums
    pub fn accumulate(&mut self, nutrients: &NutrientVector) {
        self.calories += nutrients.calories;
        self.protein_g += nutrients.protein_g;
        self.carbs_g += nutrients.carbs_g;
        self.fat_g += nutrients.fat_g;
        self.fiber_g += nutrients.fiber_g;
    }

    /// Apply the shared rounding policy once, after summing
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            calories: round_nutrient(self.calories),
            protein_g: round_nutrient(self.protein_g),
            carbs_g: round_nutrient(self.carbs_g),
            fat_g: round_nutrient(self.fat_g),
            fiber_g: round_nutrient(self.fiber_g),
        }
    }
}

/// One resolved line of a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    /// Requested amount
    pub quantity: f64,
    /// Requested unit
    pub unit: String,
    /// Resolved nutrients
    #[serde(flatten)]
    pub record: NutrientRecord,
}

/// Aggregated nutrition for a list of food items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealResult {
    /// Summed macros, rounded once
    pub total: MacroTotals,
    /// Per-item records in input order
    pub items: Vec<MealItem>,
}

// ============================================================================
// RDA inputs
// ============================================================================

/// Biological sex used by allowance tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

impl FromStr for Gender {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(AppError::invalid_input(format!(
                "Unknown gender '{other}' (expected male or female)"
            ))),
        }
    }
}

/// Habitual activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Exercise 1-3 days/week
    LightlyActive,
    /// Exercise 3-5 days/week
    ModeratelyActive,
    /// Exercise 6-7 days/week
    VeryActive,
    /// Hard training twice a day
    ExtraActive,
}

impl FromStr for ActivityLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sedentary" => Ok(Self::Sedentary),
            "lightly_active" | "light" => Ok(Self::LightlyActive),
            "moderately_active" | "moderate" => Ok(Self::ModeratelyActive),
            "very_active" | "active" => Ok(Self::VeryActive),
            "extra_active" | "athlete" => Ok(Self::ExtraActive),
            other => Err(AppError::invalid_input(format!(
                "Unknown activity level '{other}'"
            ))),
        }
    }
}

/// Who the intake is scored for
///
/// Accepted by the evaluator but not consulted by the default allowance table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Age in years
    pub age_years: Option<u32>,
    /// Biological sex
    pub gender: Option<Gender>,
    /// Body weight in kilograms
    pub weight_kg: Option<f64>,
    /// Habitual activity level
    pub activity_level: Option<ActivityLevel>,
}

impl UserProfile {
    /// Boundary validation of present fields
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when age or weight is outside a plausible human range
    pub fn validate(&self) -> AppResult<()> {
        if let Some(age) = self.age_years {
            if !(1..=120).contains(&age) {
                return Err(AppError::invalid_input(
                    "Age must be between 1 and 120 years",
                ));
            }
        }
        if let Some(weight) = self.weight_kg {
            if !weight.is_finite() || weight <= 0.0 || weight > 500.0 {
                return Err(AppError::invalid_input(
                    "Weight must be between 0 and 500 kg",
                ));
            }
        }
        Ok(())
    }
}

/// Daily intake of the nutrients the allowance table scores; missing means zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientIntake {
    /// Protein (g)
    pub protein_g: Option<f64>,
    /// Dietary fiber (g)
    pub fiber_g: Option<f64>,
    /// Vitamin C (mg)
    pub vitamin_c_mg: Option<f64>,
    /// Calcium (mg)
    pub calcium_mg: Option<f64>,
    /// Iron (mg)
    pub iron_mg: Option<f64>,
}

impl NutrientIntake {
    /// Boundary validation of present fields
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first negative or non-finite amount
    pub fn validate(&self) -> AppResult<()> {
        let fields = [
            ("protein_g", self.protein_g),
            ("fiber_g", self.fiber_g),
            ("vitamin_c_mg", self.vitamin_c_mg),
            ("calcium_mg", self.calcium_mg),
            ("iron_mg", self.iron_mg),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(AppError::invalid_input(format!(
                        "Intake {name} must be a non-negative number"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl From<&NutrientVector> for NutrientIntake {
    fn from(vector: &NutrientVector) -> Self {
        Self {
            protein_g: Some(vector.protein_g),
            fiber_g: Some(vector.fiber_g),
            vitamin_c_mg: Some(vector.micronutrients.vitamin_c),
            calcium_mg: Some(vector.micronutrients.calcium),
            iron_mg: Some(vector.micronutrients.iron),
        }
    }
}

impl From<&MacroTotals> for NutrientIntake {
    fn from(totals: &MacroTotals) -> Self {
        Self {
            protein_g: Some(totals.protein_g),
            fiber_g: Some(totals.fiber_g),
            ..Self::default()
        }
    }
}
