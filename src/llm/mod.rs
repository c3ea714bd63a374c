// ABOUTME: Text-inference collaborator abstraction used for food-aware unit estimation
// ABOUTME: Defines chat request/response types and the TextGenerator contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Text Inference
//!
//! The engine only ever asks one kind of question of a language model: "how
//! many grams is this?". The [`TextGenerator`] trait keeps the HTTP details of
//! any particular endpoint out of the conversion pipeline, and
//! [`unit_inference::UnitInferenceProvider`] narrows that further to a single
//! prompt-in, number-out call.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nutrition_engine::llm::{ChatMessage, ChatRequest, TextGenerator};
//!
//! async fn example(generator: &dyn TextGenerator) {
//!     let request = ChatRequest::new(vec![ChatMessage::user("1 cup cooked rice in grams?")])
//!         .with_max_tokens(10)
//!         .with_temperature(0.1);
//!     if let Ok(response) = generator.complete(&request).await {
//!         println!("{}", response.content);
//!     }
//! }
//! ```

/// OpenAI-compatible HTTP generator (Ollama, vLLM, `LocalAI`, hosted APIs)
pub mod openai_compatible;
/// Prompt construction and strict numeric parsing for unit inference
pub mod unit_inference;

use crate::errors::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleGenerator};
pub use unit_inference::{LlmUnitInference, UnitInferenceProvider};

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input message
    User,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier (provider-specific)
    pub model: Option<String>,
    /// Temperature for response randomness (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response from a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated message content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

// ============================================================================
// Generator Trait
// ============================================================================

/// Text generation collaborator
///
/// Implementations must be cheap to share (`Arc<dyn TextGenerator>`); the
/// engine issues at most one request per distinct conversion key.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier used in logs (e.g., "ollama", "vllm")
    fn name(&self) -> &'static str;

    /// Perform a non-streaming chat completion
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;
}
