// ABOUTME: nutrition-cli - command-line driver for the nutrition engine
// ABOUTME: Looks up foods, aggregates meals and scores RDA intake, printing JSON to stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Nutrients for one quantity
//! nutrition-cli lookup rice 1 cup
//!
//! # Meal totals, local table only (default) or through every tier
//! nutrition-cli meal --item "rice:1:cup" --item "chicken breast:150:g"
//! nutrition-cli meal --item "egg:2:piece" --tiered
//!
//! # RDA scoring
//! nutrition-cli rda --protein-g 40 --fiber-g 10 --iron-mg 12
//! ```
//!
//! Logs go to stderr. Malformed arguments exit with status 2.

mod commands;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use nutrition_engine::config::EngineConfig;
use nutrition_engine::engine::NutritionEngine;
use nutrition_engine::logging::LoggingConfig;
use nutrition_engine::models::{
    ActivityLevel, FoodQuantity, Gender, NutrientIntake, UserProfile,
};

#[derive(Parser)]
#[command(
    name = "nutrition-cli",
    about = "Nutrition engine CLI",
    long_about = "Resolve food quantities to nutrients, aggregate meals and score intake against daily allowances. Configuration comes from the environment (USDA_API_KEY, LOCAL_LLM_BASE_URL, ...)."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Nutrients for one food quantity
    Lookup {
        /// Food name, e.g. "chicken breast"
        food: String,

        /// Amount in `unit`
        #[arg(allow_negative_numbers = true)]
        quantity: f64,

        /// Unit, e.g. g, cup, piece (default: g)
        #[arg(default_value = "g")]
        unit: String,
    },

    /// Aggregate nutrients over several items
    Meal {
        /// Item as "food:quantity:unit" (repeatable)
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<FoodQuantity>,

        /// Resolve through the remote source before the local table
        #[arg(long)]
        tiered: bool,

        /// Resolve through the local table only
        #[arg(long, conflicts_with = "tiered")]
        local: bool,
    },

    /// Score a daily intake against recommended allowances
    Rda {
        /// Protein intake (g)
        #[arg(long)]
        protein_g: Option<f64>,

        /// Fiber intake (g)
        #[arg(long)]
        fiber_g: Option<f64>,

        /// Vitamin C intake (mg)
        #[arg(long)]
        vitamin_c_mg: Option<f64>,

        /// Calcium intake (mg)
        #[arg(long)]
        calcium_mg: Option<f64>,

        /// Iron intake (mg)
        #[arg(long)]
        iron_mg: Option<f64>,

        /// Age in years
        #[arg(long)]
        age: Option<u32>,

        /// male or female
        #[arg(long)]
        gender: Option<Gender>,

        /// Body weight (kg)
        #[arg(long)]
        weight_kg: Option<f64>,

        /// sedentary, lightly_active, moderately_active, very_active or extra_active
        #[arg(long)]
        activity_level: Option<ActivityLevel>,
    },
}

/// Parse "food:quantity[:unit]"; a missing unit means grams
fn parse_item(raw: &str) -> Result<FoodQuantity, String> {
    let parts = raw.split(':').map(str::trim).collect::<Vec<_>>();
    let (food, quantity, unit) = match parts.as_slice() {
        [food, quantity, unit] => (*food, *quantity, *unit),
        [food, quantity] => (*food, *quantity, "g"),
        _ => return Err(format!("expected food:quantity:unit, got '{raw}'")),
    };
    let quantity = quantity
        .parse::<f64>()
        .map_err(|_| format!("invalid quantity '{quantity}' in item '{raw}'"))?;

    let item = FoodQuantity::new(food, quantity, unit);
    item.validate().map_err(|e| e.message)?;
    Ok(item)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging.level = "debug".into();
    }
    logging.init()?;

    let config = EngineConfig::from_env()?;
    let engine = NutritionEngine::from_config(&config)?;

    match cli.command {
        Command::Lookup {
            food,
            quantity,
            unit,
        } => commands::lookup(&engine, &food, quantity, &unit).await?,
        Command::Meal {
            items,
            tiered,
            local,
        } => {
            let mode = commands::meal_mode(&engine, tiered, local);
            commands::meal(&engine, &items, mode).await?;
        }
        Command::Rda {
            protein_g,
            fiber_g,
            vitamin_c_mg,
            calcium_mg,
            iron_mg,
            age,
            gender,
            weight_kg,
            activity_level,
        } => {
            let profile = UserProfile {
                age_years: age,
                gender,
                weight_kg,
                activity_level,
            };
            let intake = NutrientIntake {
                protein_g,
                fiber_g,
                vitamin_c_mg,
                calcium_mg,
                iron_mg,
            };
            if let Err(e) = profile.validate().and_then(|()| intake.validate()) {
                Cli::command()
                    .error(ErrorKind::ValueValidation, e.message)
                    .exit();
            }
            commands::rda(&engine, &profile, &intake)?;
        }
    }

    Ok(())
}
