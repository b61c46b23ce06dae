//! LLM Client implementation
//!
//! Talks to any OpenAI-compatible chat completions endpoint (OpenAI, GitHub
//! Models, Azure inference, Ollama, LM Studio).

use super::chat::{ChatMessage, ChatRequest, ChatResponse};
use super::{CompletionService, LlmConfig};
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client as HttpClient, StatusCode,
};

/// Main LLM Client
pub struct LlmClient {
    config: LlmConfig,
    http_client: HttpClient,
}

impl LlmClient {
    /// Create a new LLM client
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(concat!("travel-health/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(LlmClient {
            config,
            http_client,
        })
    }

    /// Send a chat request and get the full response
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let body = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        };

        tracing::debug!(model = %self.config.model, messages = messages.len(), "chat request");
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(&url)
            .headers(self.build_headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&text);
            tracing::warn!(%status, elapsed = ?start.elapsed(), "chat request failed");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Unauthorized { message },
                StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimitExceeded { message },
                _ => AgentError::ProviderError {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: ChatResponse = serde_json::from_str(&text)?;

        match &parsed.usage {
            Some(usage) => {
                tracing::debug!(elapsed = ?start.elapsed(), "chat completed: {}", usage)
            }
            None => tracing::debug!(elapsed = ?start.elapsed(), "chat completed (no usage data)"),
        }

        Ok(parsed)
    }

    fn transport_error(&self, err: reqwest::Error) -> AgentError {
        if err.is_timeout() {
            AgentError::Timeout {
                duration: self.config.timeout,
            }
        } else {
            err.into()
        }
    }

    /// Build headers for API requests
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self.chat(messages).await?;
        Ok(response.content().to_string())
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to
/// the raw text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "Unknown error".to_string()
            } else {
                trimmed.to_string()
            }
        })
}
