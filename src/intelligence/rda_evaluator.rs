// ABOUTME: Scores a daily nutrient intake against recommended daily allowances
// ABOUTME: Pure computation with a pluggable allowance table and an explicit deficiency threshold
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # RDA Evaluator
//!
//! For each allowance, `percentage = round1(intake / rda * 100)` when
//! `rda > 0`, else `0`. A nutrient is deficient when `rda > 0` and its
//! percentage is below the threshold. The evaluator never fails and never
//! validates its inputs; use [`NutrientIntake::validate`] at the boundary.

use crate::constants::rda::DEFAULT_DEFICIENCY_THRESHOLD_PERCENT;
use crate::constants::rounding::RDA_PERCENT_DECIMALS;
use crate::models::{round_to, NutrientIntake, UserProfile};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Nutrients scored against an allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RdaNutrient {
    /// Protein (g)
    ProteinG,
    /// Dietary fiber (g)
    FiberG,
    /// Vitamin C (mg)
    VitaminCMg,
    /// Calcium (mg)
    CalciumMg,
    /// Iron (mg)
    IronMg,
}

impl RdaNutrient {
    /// Stable key, matching the intake field name
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::ProteinG => "protein_g",
            Self::FiberG => "fiber_g",
            Self::VitaminCMg => "vitamin_c_mg",
            Self::CalciumMg => "calcium_mg",
            Self::IronMg => "iron_mg",
        }
    }

    /// Intake amount for this nutrient; missing reads as zero
    #[must_use]
    pub fn intake_from(&self, intake: &NutrientIntake) -> f64 {
        let value = match self {
            Self::ProteinG => intake.protein_g,
            Self::FiberG => intake.fiber_g,
            Self::VitaminCMg => intake.vitamin_c_mg,
            Self::CalciumMg => intake.calcium_mg,
            Self::IronMg => intake.iron_mg,
        };
        value.unwrap_or(0.0)
    }
}

impl fmt::Display for RdaNutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One allowance table row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allowance {
    /// Scored nutrient
    pub nutrient: RdaNutrient,
    /// Recommended daily amount in the nutrient's unit
    pub rda: f64,
}

/// Canonical adult allowances, in reporting order
pub const STANDARD_ALLOWANCES: [Allowance; 5] = [
    Allowance {
        nutrient: RdaNutrient::ProteinG,
        rda: 50.0,
    },
    Allowance {
        nutrient: RdaNutrient::FiberG,
        rda: 25.0,
    },
    Allowance {
        nutrient: RdaNutrient::VitaminCMg,
        rda: 90.0,
    },
    Allowance {
        nutrient: RdaNutrient::CalciumMg,
        rda: 1000.0,
    },
    Allowance {
        nutrient: RdaNutrient::IronMg,
        rda: 18.0,
    },
];

/// Source of allowances for a profile
///
/// The standard table ignores the profile; implement this trait for
/// age-, sex- or weight-dependent allowances.
pub trait AllowanceTable: Send + Sync {
    /// Allowances in reporting order
    fn allowances(&self, profile: &UserProfile) -> Vec<Allowance>;
}

/// The fixed canonical table
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardAllowances;

impl AllowanceTable for StandardAllowances {
    fn allowances(&self, _profile: &UserProfile) -> Vec<Allowance> {
        STANDARD_ALLOWANCES.to_vec()
    }
}

impl AllowanceTable for Vec<Allowance> {
    fn allowances(&self, _profile: &UserProfile) -> Vec<Allowance> {
        self.clone()
    }
}

/// Score of one nutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientScore {
    /// Scored nutrient
    pub nutrient: RdaNutrient,
    /// Reported intake
    pub intake: f64,
    /// Allowance used
    pub rda: f64,
    /// Intake as a percentage of the allowance, one decimal
    pub percentage: f64,
}

/// Scores in allowance-table order plus the deficient nutrients
///
/// Serializes as `{"scores": {"protein_g": {"intake", "rda", "percentage"}, ..},
/// "deficiencies": ["fiber_g", ..]}`, keeping table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RdaResult {
    /// One score per allowance
    #[serde(serialize_with = "serialize_scores")]
    pub scores: Vec<NutrientScore>,
    /// Nutrients below the threshold, in table order
    pub deficiencies: Vec<RdaNutrient>,
}

impl RdaResult {
    /// Score for one nutrient, if the table covered it
    #[must_use]
    pub fn score(&self, nutrient: RdaNutrient) -> Option<&NutrientScore> {
        self.scores.iter().find(|s| s.nutrient == nutrient)
    }
}

fn serialize_scores<S>(scores: &[NutrientScore], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    #[derive(Serialize)]
    struct Entry {
        intake: f64,
        rda: f64,
        percentage: f64,
    }

    let mut map = serializer.serialize_map(Some(scores.len()))?;
    for score in scores {
        map.serialize_entry(
            score.nutrient.key(),
            &Entry {
                intake: score.intake,
                rda: score.rda,
                percentage: score.percentage,
            },
        )?;
    }
    map.end()
}

/// Percentage of `rda` met by `intake`, zero when `rda <= 0`
#[must_use]
pub fn percentage_of_rda(intake: f64, rda: f64) -> f64 {
    if rda > 0.0 {
        round_to(intake / rda * 100.0, RDA_PERCENT_DECIMALS)
    } else {
        0.0
    }
}

/// Intake scorer
#[derive(Clone)]
pub struct RdaEvaluator {
    table: Arc<dyn AllowanceTable>,
    threshold_percent: f64,
}

impl Default for RdaEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl RdaEvaluator {
    /// Standard table, default threshold
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::new(StandardAllowances),
            threshold_percent: DEFAULT_DEFICIENCY_THRESHOLD_PERCENT,
        }
    }

    /// Replace the allowance table
    #[must_use]
    pub fn with_table(mut self, table: Arc<dyn AllowanceTable>) -> Self {
        self.table = table;
        self
    }

    /// Replace the deficiency threshold (percent of RDA)
    #[must_use]
    pub const fn with_threshold(mut self, threshold_percent: f64) -> Self {
        self.threshold_percent = threshold_percent;
        self
    }

    /// Configured deficiency threshold
    #[must_use]
    pub const fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }

    /// Score `intake` for `profile`
    #[must_use]
    pub fn evaluate(&self, profile: &UserProfile, intake: &NutrientIntake) -> RdaResult {
        let mut result = RdaResult::default();

        for Allowance { nutrient, rda } in self.table.allowances(profile) {
            let amount = nutrient.intake_from(intake);
            let percentage = percentage_of_rda(amount, rda);
            if rda > 0.0 && percentage < self.threshold_percent {
                result.deficiencies.push(nutrient);
            }
            result.scores.push(NutrientScore {
                nutrient,
                intake: amount,
                rda,
                percentage,
            });
        }

        result
    }
}
