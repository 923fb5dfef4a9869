/*!
 * Provider implementations for text generation services.
 *
 * This module contains client implementations for the supported generators:
 * - Anthropic: Anthropic messages API
 * - Ollama: Local LLM server
 * - Mock: Scripted replies for tests
 *
 * Every client is driven through the provider-neutral `GenerationRequest`
 * and `Generation` types, so the translation engine never sees wire formats.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Provider-neutral generation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    /// Large, stable instructions (cacheable)
    pub system_instructions: String,
    /// Conversation turns; a trailing assistant turn primes the answer
    pub turns: Vec<Turn>,
    /// Output token ceiling
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Ask the provider to cache the system instructions
    pub cache_hint: bool,
    /// Sequences that end generation
    pub stop_markers: Vec<String>,
}

/// Why generation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// A stop marker was produced (and is not part of the content)
    StopMarker,
    /// The token ceiling was reached
    MaxTokens,
    /// Natural end or anything else
    Other,
}

/// Provider-neutral generation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text, without the primer
    pub content: String,
    /// Why generation ended
    pub stop_reason: StopReason,
    /// Tokens generated
    pub output_tokens: u32,
}

/// Common trait for all text generators
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation engine.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Generate a continuation of the conversation
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Generation, ProviderError>` - The generated text or an error
    async fn complete(&self, request: GenerationRequest) -> Result<Generation, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Build the configured provider
pub fn create_provider(config: &TranslationConfig) -> Arc<dyn Provider> {
    match config.provider {
        TranslationProvider::Anthropic => Arc::new(anthropic::Anthropic::new(
            config.get_api_key(),
            config.get_endpoint(),
            config.get_model(),
            config.get_timeout_secs(),
            config.get_headers(),
        )),
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::new(
            config.get_endpoint(),
            config.get_model(),
            config.get_timeout_secs(),
            config.get_headers(),
        )),
    }
}
