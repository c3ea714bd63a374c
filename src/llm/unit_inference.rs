// ABOUTME: Unit inference port: a food-aware prompt goes in, a gram weight comes out
// ABOUTME: Wraps any TextGenerator with the few-shot prompt and strict numeric parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{ChatMessage, ChatRequest, TextGenerator};
use crate::constants::inference::{MAX_TOKENS, TEMPERATURE};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

const SERVICE: &str = "unit inference";

/// Worked conversions embedded in every prompt
const FEW_SHOT_EXAMPLES: &[&str] = &[
    "1 pcs duck egg = 70 grams (duck eggs are larger than chicken eggs)",
    "1 pcs chicken egg = 50 grams",
    "1 cup cooked rice = 185 grams",
    "1 glass milk = 250 grams",
    "1 katori dal = 150 grams",
    "1 bowl salad = 200 grams",
    "1 slice pizza = 120 grams",
    "1 piece roti = 30 grams",
    "1 tbsp ghee = 15 grams",
];

/// Estimates the gram weight described by a conversion prompt
///
/// One method, prompt in and number out, so the converter's caching and
/// fallback logic can be exercised with a stub and no network.
#[async_trait]
pub trait UnitInferenceProvider: Send + Sync {
    /// Return a finite, non-negative gram weight for `prompt`
    ///
    /// # Errors
    ///
    /// Returns an error when the collaborator fails or answers with anything
    /// other than a bare number.
    async fn infer_grams(&self, prompt: &str) -> AppResult<f64>;
}

/// Build the conversion prompt for `quantity unit` of `food_name`
#[must_use]
pub fn build_conversion_prompt(food_name: &str, quantity: f64, unit: &str) -> String {
    let examples = FEW_SHOT_EXAMPLES
        .iter()
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Convert {quantity} {unit} of \"{food_name}\" to grams.\n\n\
         Consider the specific food type, typical size, and common serving amounts. Be precise.\n\n\
         Examples of good conversions:\n{examples}\n\n\
         Now convert: {quantity} {unit} of \"{food_name}\"\n\n\
         Return ONLY the number of grams. No explanation, units, or text - just the numeric value like \"70\" or \"185\"."
    )
}

/// Accept a response only if, once trimmed, it is a finite non-negative number
///
/// # Errors
///
/// Returns `ExternalServiceError` describing the rejected text.
pub fn parse_grams(response: &str) -> AppResult<f64> {
    let trimmed = response.trim();
    let value: f64 = trimmed.parse().map_err(|_| {
        AppError::external_service(SERVICE, format!("non-numeric response '{trimmed}'"))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::external_service(
            SERVICE,
            format!("out-of-range response '{trimmed}'"),
        ));
    }
    Ok(value)
}

/// [`UnitInferenceProvider`] backed by a chat-completion [`TextGenerator`]
pub struct LlmUnitInference {
    generator: Arc<dyn TextGenerator>,
    model: Option<String>,
}

impl LlmUnitInference {
    /// Use the generator's default model
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            model: None,
        }
    }

    /// Pin a model name on every request
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[async_trait]
impl UnitInferenceProvider for LlmUnitInference {
    async fn infer_grams(&self, prompt: &str) -> AppResult<f64> {
        let mut request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_max_tokens(MAX_TOKENS)
            .with_temperature(TEMPERATURE);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        let response = self.generator.complete(&request).await?;
        debug!(
            generator = self.generator.name(),
            raw = %response.content.trim(),
            "Unit inference answered"
        );
        parse_grams(&response.content)
    }
}
