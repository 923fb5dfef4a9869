/*!
 * Tests for provider construction and the provider-neutral types
 */

use std::sync::Arc;
use yahtwai::app_config::{Config, TranslationProvider};
use yahtwai::errors::ProviderError;
use yahtwai::providers::mock::ScriptedProvider;
use yahtwai::providers::{GenerationRequest, Provider, Role, StopReason, Turn, create_provider};

fn request(primer: &str) -> GenerationRequest {
    GenerationRequest {
        system_instructions: "Translate the page".to_string(),
        turns: vec![Turn::user("Continue"), Turn::assistant(primer)],
        max_tokens: 1000,
        temperature: 0.3,
        cache_hint: true,
        stop_markers: vec!["</body>".to_string()],
    }
}

#[test]
fn test_createProvider_shouldFollowConfiguredProvider() {
    let mut config = Config::default();
    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    let provider = create_provider(&config.translation);
    assert!(format!("{:?}", provider).starts_with("Anthropic"));

    config.translation.provider = TranslationProvider::Ollama;
    config.translation.active_provider_config_mut().endpoint = "gpu-box".to_string();
    let provider = create_provider(&config.translation);
    let debug = format!("{:?}", provider);
    assert!(debug.starts_with("Ollama"));
    assert!(debug.contains("http://gpu-box:11434"));
}

#[test]
fn test_turn_constructors_shouldSetRoles() {
    assert_eq!(Turn::user("a").role, Role::User);
    assert_eq!(Turn::assistant("b").role, Role::Assistant);
    assert_eq!(Role::Assistant.as_str(), "assistant");
}

#[tokio::test]
async fn test_scriptedProvider_behindTraitObject_shouldRecordRequests() {
    let scripted = ScriptedProvider::new(vec![
        ScriptedProvider::stop("p>Hello</p>"),
        ScriptedProvider::error(ProviderError::RateLimitExceeded("quota".to_string())),
    ]);
    let provider: Arc<dyn Provider> = Arc::new(scripted.clone());

    let generation = provider.complete(request("<body><")).await.unwrap();
    assert_eq!(generation.stop_reason, StopReason::StopMarker);
    assert_eq!(generation.content, "p>Hello</p>");

    let error = provider.complete(request("")).await.unwrap_err();
    assert!(error.is_fatal());

    let requests = scripted.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].turns[1].content, "<body><");
    assert!(requests[1].cache_hint);
    assert!(provider.test_connection().await.is_ok());
}
