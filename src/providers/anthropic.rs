use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::{Generation, GenerationRequest, Provider, Role, StopReason};
use crate::errors::ProviderError;

/// Anthropic API version sent with every request
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic client for interacting with Anthropic API
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
    /// Model name
    model: String,
    /// Extra headers (beta flags and the like)
    headers: HeaderMap,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// System blocks
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<AnthropicContent>,

    /// Temperature for generation
    temperature: f32,

    /// Maximum number of tokens to generate
    max_tokens: u32,

    /// Sequences that stop generation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content blocks of the message
    pub content: Vec<AnthropicContent>,
}

/// Prompt caching marker
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheControl {
    #[serde(rename = "type")]
    pub cache_type: String,
}

/// Individual content block
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The actual text content
    #[serde(default)]
    pub text: String,

    /// Cache marker for the block
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cache_control: Option<CacheControl>,
}

impl AnthropicContent {
    fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
            cache_control: None,
        }
    }
}

/// Token usage information
#[derive(Debug, Deserialize, Default)]
pub struct TokenUsage {
    /// Number of input tokens
    #[serde(default)]
    pub input_tokens: u32,
    /// Number of output tokens
    #[serde(default)]
    pub output_tokens: u32,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content of the response
    pub content: Vec<AnthropicContent>,
    /// Why generation stopped
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Token usage information
    #[serde(default)]
    pub usage: TokenUsage,
}

impl AnthropicResponse {
    /// Convert into a provider-neutral generation
    pub fn into_generation(self) -> Generation {
        let stop_reason = match self.stop_reason.as_deref() {
            Some("stop_sequence") => StopReason::StopMarker,
            Some("max_tokens") => StopReason::MaxTokens,
            _ => StopReason::Other,
        };
        let content = self
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text)
            .collect();
        Generation {
            content,
            stop_reason,
            output_tokens: self.usage.output_tokens,
        }
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!("Ignoring invalid header: {}", name),
        }
    }
    map
}

impl Anthropic {
    /// Create a new Anthropic client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        headers: BTreeMap<String, String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            headers: header_map(&headers),
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Build the wire request for a generation request
    pub fn build_request(&self, request: &GenerationRequest) -> AnthropicRequest {
        let mut system = Vec::new();
        if !request.system_instructions.is_empty() {
            let mut block = AnthropicContent::text(request.system_instructions.clone());
            if request.cache_hint {
                block.cache_control = Some(CacheControl { cache_type: "ephemeral".to_string() });
            }
            system.push(block);
        }

        let messages = request
            .turns
            .iter()
            // Empty text blocks are rejected by the API
            .filter(|turn| !(turn.role == Role::Assistant && turn.content.is_empty()))
            .map(|turn| AnthropicMessage {
                role: turn.role.as_str().to_string(),
                content: vec![AnthropicContent::text(turn.content.clone())],
            })
            .collect();

        AnthropicRequest {
            model: self.model.clone(),
            messages,
            system,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stop_sequences: request.stop_markers.clone(),
        }
    }

    async fn send(&self, request: &AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let response = self
            .client
            .post(self.api_url())
            .headers(self.headers.clone())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Anthropic API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response
            .json::<AnthropicResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl Provider for Anthropic {
    async fn complete(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        let wire = self.build_request(&request);
        debug!(
            "Anthropic request: model={} max_tokens={} temperature={} cache={}",
            self.model, request.max_tokens, request.temperature, request.cache_hint
        );
        Ok(self.send(&wire).await?.into_generation())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = GenerationRequest {
            system_instructions: String::new(),
            turns: vec![super::Turn::user("Hello")],
            max_tokens: 10,
            temperature: 0.0,
            cache_hint: false,
            stop_markers: Vec::new(),
        };
        self.complete(request).await.map(|_| ())
    }
}
