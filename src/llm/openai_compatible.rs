// ABOUTME: Generic OpenAI-compatible text generator for local and cloud endpoints
// ABOUTME: Supports Ollama, vLLM, LocalAI, and any OpenAI-compatible chat completions API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Generator
//!
//! Any endpoint that implements `POST {base_url}/chat/completions` works here.
//! The request timeout is the unit-inference bound, so a slow model degrades to
//! the next conversion tier instead of stalling a meal.
//!
//! ## Supported Backends
//!
//! - **Ollama**: <http://localhost:11434/v1>
//! - **vLLM**: <http://localhost:8000/v1>
//! - **`LocalAI`**: <http://localhost:8080/v1>

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{ChatMessage, ChatRequest, ChatResponse, TextGenerator, TokenUsage};
use crate::config::InferenceConfig;
use crate::constants::{inference, timeouts};
use crate::errors::{AppError, ErrorCode};

/// Service label used in error messages
const SERVICE: &str = "LocalLLM";

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for OpenAiMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

// ============================================================================
// Generator Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible generator
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <http://localhost:11434/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Model used when a request does not name one
    pub default_model: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl OpenAiCompatibleConfig {
    /// Configuration for a local Ollama instance
    #[must_use]
    pub fn ollama(model: &str) -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_owned(),
            api_key: None,
            default_model: model.to_owned(),
            timeout: Duration::from_secs(timeouts::UNIT_INFERENCE_TIMEOUT_SECS),
        }
    }

    /// Configuration derived from the engine's inference settings
    ///
    /// Returns `None` when no base URL is configured.
    #[must_use]
    pub fn from_inference_config(config: &InferenceConfig) -> Option<Self> {
        let base_url = config.base_url.clone()?;
        Some(Self {
            base_url,
            api_key: config.api_key.clone(),
            default_model: config.model.clone(),
            timeout: config.timeout,
        })
    }
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self::ollama(inference::DEFAULT_MODEL)
    }
}

// ============================================================================
// Generator Implementation
// ============================================================================

/// Generic `OpenAI`-compatible text generator
pub struct OpenAiCompatibleGenerator {
    client: Client,
    config: OpenAiCompatibleConfig,
    provider_name: &'static str,
}

impl OpenAiCompatibleGenerator {
    /// Create a new generator with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts::LLM_CONNECT_TIMEOUT_SECS))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        // Detect backend from URL for log labels
        let provider_name = if config.base_url.contains(":11434") {
            "ollama"
        } else if config.base_url.contains(":8000") {
            "vllm"
        } else if config.base_url.contains(":8080") {
            "localai"
        } else {
            "local"
        };

        debug!(
            provider = provider_name,
            base_url = %config.base_url,
            model = %config.default_model,
            "Initialized OpenAI-compatible generator"
        );

        Ok(Self {
            client,
            config,
            provider_name,
        })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Map a non-2xx response to a classified error
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        let detail = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |parsed| parsed.error.message,
        );

        match status.as_u16() {
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{SERVICE}: authentication failed: {detail}"),
            ),
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("{SERVICE}: rate limit reached: {detail}"),
            ),
            502..=504 => AppError::external_unavailable(
                SERVICE,
                format!("server is not responding ({status})"),
            ),
            _ => AppError::external_service(SERVICE, format!("API error ({status}): {detail}")),
        }
    }

    /// Add authorization header if API key is configured
    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.bearer_auth(api_key)
        } else {
            request
        }
    }

    fn map_send_error(&self, e: &reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::external_timeout(SERVICE, self.config.timeout)
        } else if e.is_connect() {
            AppError::external_unavailable(
                SERVICE,
                format!("cannot connect to {}", self.config.base_url),
            )
        } else {
            AppError::external_service(SERVICE, format!("request failed: {e}"))
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    fn name(&self) -> &'static str {
        self.provider_name
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let body = OpenAiRequest {
            model,
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let http_request = self.client.post(self.api_url("chat/completions")).json(&body);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                warn!(provider = self.provider_name, error = %e, "Inference request failed");
                self.map_send_error(&e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(&e))?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &text));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&text).map_err(|e| {
            AppError::external_service(SERVICE, format!("Failed to parse response: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE, "API returned no choices"))?;

        let content = choice.message.content.unwrap_or_default();

        debug!(
            provider = self.provider_name,
            chars = content.len(),
            finish_reason = ?choice.finish_reason,
            "Received inference response"
        );

        Ok(ChatResponse {
            content,
            model: if parsed.model.is_empty() {
                model.to_owned()
            } else {
                parsed.model
            },
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}
