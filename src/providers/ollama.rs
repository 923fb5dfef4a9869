use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use super::{Generation, GenerationRequest, Provider, StopReason};
use crate::errors::ProviderError;

/// Port used when the endpoint does not name one
const DEFAULT_PORT: u16 = 11434;

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name
    model: String,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    /// Stop sequences
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    stop: Vec<String>,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    options: GenerationOptions,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Why generation ended ("stop", "length")
    #[serde(default)]
    pub done_reason: Option<String>,
    /// Number of generated tokens
    #[serde(default)]
    pub eval_count: Option<u64>,
}

impl ChatResponse {
    /// Convert into a provider-neutral generation
    pub fn into_generation(self) -> Generation {
        let stop_reason = match self.done_reason.as_deref() {
            Some("length") => StopReason::MaxTokens,
            _ => StopReason::Other,
        };
        Generation {
            content: self.message.content,
            stop_reason,
            output_tokens: self.eval_count.unwrap_or(0) as u32,
        }
    }
}

/// Normalize an endpoint into a base URL with scheme and port
pub fn normalize_base_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let with_scheme = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };

    match Url::parse(&with_scheme) {
        Ok(mut url) => {
            if url.port().is_none() && url.scheme() == "http" {
                // set_port only fails for URLs that cannot carry a port
                let _ = url.set_port(Some(DEFAULT_PORT));
            }
            url.as_str().trim_end_matches('/').to_string()
        }
        Err(e) => {
            warn!("Invalid Ollama endpoint {:?} ({}), using localhost", endpoint, e);
            format!("http://localhost:{}", DEFAULT_PORT)
        }
    }
}

impl Ollama {
    /// Create a new Ollama client
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        headers: BTreeMap<String, String>,
    ) -> Self {
        let mut default_headers = HeaderMap::new();
        for (name, value) in &headers {
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                default_headers.insert(name, value);
            }
        }

        Self {
            base_url: normalize_base_url(&endpoint.into()),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama uses HTTP/1.1
                .http1_only()
                .default_headers(default_headers)
                .build()
                .unwrap_or_default(),
            model: model.into(),
        }
    }

    /// Build the wire request for a generation request
    pub fn build_request(&self, request: &GenerationRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        if !request.system_instructions.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: request.system_instructions.clone(),
            });
        }
        messages.extend(request.turns.iter().filter(|t| !t.content.is_empty()).map(|turn| ChatMessage {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }));

        ChatRequest {
            model: self.model.clone(),
            messages,
            options: GenerationOptions {
                temperature: Some(request.temperature),
                num_predict: Some(request.max_tokens),
                stop: request.stop_markers.clone(),
            },
            stream: false,
        }
    }

    /// Send a chat request
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        let wire = self.build_request(&request);
        debug!(
            "Ollama request: model={} num_predict={} temperature={}",
            self.model, request.max_tokens, request.temperature
        );
        Ok(self.chat(&wire).await?.into_generation())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::from_status(response.status().as_u16(), "version check failed".to_string()))
        }
    }
}
