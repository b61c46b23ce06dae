//! LLM client module
//!
//! Everything that talks to the model goes through [`CompletionService`].
//! [`LlmClient`] is the OpenAI-compatible implementation; tests substitute
//! scripted fakes.

pub mod chat;
pub mod client;

pub use chat::{ChatMessage, ChatRequest, ChatResponse, MessageRole, Usage};
pub use client::LlmClient;

use crate::config::Config;
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Shared handle used by every agent for text generation
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send the conversation, get the model's reply text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// LLM Configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API endpoint base URL
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// API key
    pub api_key: String,
    /// Maximum tokens in response
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl LlmConfig {
    /// Create a new LLM config
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        LlmConfig {
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            max_tokens: None,
            temperature: None,
            timeout: Duration::from_secs(300),
        }
    }

    /// Build from the provider section and an already resolved credential
    pub fn from_config(config: &Config, api_key: String) -> Self {
        let provider = &config.provider;
        LlmConfig {
            base_url: provider.base_url.clone(),
            model: provider.model.clone(),
            api_key,
            max_tokens: provider.max_tokens,
            temperature: provider.temperature,
            timeout: Duration::from_secs(provider.timeout_secs),
        }
    }

    /// Set maximum tokens
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp.clamp(0.0, 2.0));
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Build the shared completion service.
///
/// The credential is resolved first so a missing key fails before any HTTP
/// client exists.
pub fn create_service(config: &Config) -> std::result::Result<Arc<dyn CompletionService>, ConfigError> {
    let api_key = config.credential()?;
    let client = LlmClient::new(LlmConfig::from_config(config, api_key)).map_err(|e| {
        ConfigError::Invalid {
            message: format!("failed to build HTTP client: {}", e),
        }
    })?;
    tracing::info!(
        base_url = %config.provider.base_url,
        model = %config.provider.model,
        "completion service ready"
    );
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_builder() {
        let config = LlmConfig::new("http://localhost", "gpt-4o", "key")
            .with_max_tokens(256)
            .with_temperature(5.0)
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.max_tokens, Some(256));
        assert_eq!(config.temperature, Some(2.0));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_config_copies_provider() {
        let mut config = Config::default();
        config.provider.model = "gpt-4o-mini".to_string();
        config.provider.max_tokens = Some(512);
        config.provider.timeout_secs = 30;
        let llm = LlmConfig::from_config(&config, "secret".to_string());
        assert_eq!(llm.model, "gpt-4o-mini");
        assert_eq!(llm.api_key, "secret");
        assert_eq!(llm.max_tokens, Some(512));
        assert_eq!(llm.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_create_service_requires_credential() {
        let mut config = Config::default();
        config.provider.api_key_env = "TRAVEL_HEALTH_TEST_UNSET_CREDENTIAL".to_string();
        let err = create_service(&config).err().unwrap();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }
}
