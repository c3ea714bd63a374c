// ABOUTME: Shared test utilities and stub collaborators for integration tests
// ABOUTME: Counting inference and text generators, a scripted food source, quiet logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `nutrition_engine`

use async_trait::async_trait;
use nutrition_engine::errors::{AppError, AppResult};
use nutrition_engine::external::{FoodCompositionSource, FoodMatch, FoodNutrient};
use nutrition_engine::llm::{ChatRequest, ChatResponse, TextGenerator, UnitInferenceProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Unit inference stubs
// ============================================================================

enum InferenceBehavior {
    Grams(f64),
    Fail,
}

/// Inference provider that counts calls and answers with a fixed outcome
pub struct CountingInference {
    behavior: InferenceBehavior,
    delay: Duration,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl CountingInference {
    /// Always answers `grams`
    pub fn returning(grams: f64) -> Self {
        Self::with_behavior(InferenceBehavior::Grams(grams))
    }

    /// Always fails with an external-service error
    pub fn failing() -> Self {
        Self::with_behavior(InferenceBehavior::Fail)
    }

    fn with_behavior(behavior: InferenceBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl UnitInferenceProvider for CountingInference {
    async fn infer_grams(&self, prompt: &str) -> AppResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_owned());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.behavior {
            InferenceBehavior::Grams(grams) => Ok(grams),
            InferenceBehavior::Fail => Err(AppError::external_service(
                "unit inference",
                "stub failure",
            )),
        }
    }
}

/// Text generator that answers every request with the same content
pub struct ScriptedTextGenerator {
    content: String,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTextGenerator {
    pub fn answering(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedTextGenerator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        Ok(ChatResponse {
            content: self.content.clone(),
            model: request.model.clone().unwrap_or_else(|| "scripted".to_owned()),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }
}

// ============================================================================
// Food composition stubs
// ============================================================================

/// Build a match from `(nutrient_id, amount per 100 g)` pairs
pub fn food_match(description: &str, nutrients: &[(u32, f64)]) -> FoodMatch {
    FoodMatch {
        fdc_id: Some(1),
        description: description.to_owned(),
        data_type: Some("SR Legacy".to_owned()),
        nutrients: nutrients
            .iter()
            .map(|&(nutrient_id, amount)| FoodNutrient {
                nutrient_id,
                amount,
            })
            .collect(),
    }
}

/// Food source answering from a fixed query table
pub struct ScriptedFoodSource {
    matches: HashMap<String, FoodMatch>,
    fail: bool,
    delay: Duration,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl ScriptedFoodSource {
    /// Source with no matches
    pub fn empty() -> Self {
        Self {
            matches: HashMap::new(),
            fail: false,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Source that errors on every search
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::empty()
        }
    }

    /// Answer `query` (exact, case-sensitive) with `found`
    pub fn with_match(mut self, query: &str, found: FoodMatch) -> Self {
        self.matches.insert(query.to_owned(), found);
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl FoodCompositionSource for ScriptedFoodSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn search(
        &self,
        query: &str,
        _dataset_filter: &str,
        _page_size: u32,
    ) -> AppResult<Option<FoodMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_owned());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(AppError::external_unavailable("scripted", "stub outage"));
        }
        Ok(self.matches.get(query).cloned())
    }
}
