//! Generative model API client
//!
//! Provides the `GenerativeModel` seam and its Gemini implementation:
//! - Endpoint: POST {base}/v1/models/{model}:generateContent
//! - Auth: `x-goog-api-key` header
//! - One request per call, bounded by the configured timeout

use crate::cli::config::ModelConfig;
use crate::errors::AdvisoryFailure;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Gemini API endpoint
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default request timeout (30 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body kept in failure messages
const MAX_ERROR_BODY: usize = 512;

/// A text-generation backend
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send `prompt` and return the reply text
    async fn generate(&self, prompt: &str) -> Result<String, AdvisoryFailure>;

    /// Model identifier for logs
    fn model_name(&self) -> &str;
}

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create client with default endpoint and model
    pub fn new(api_key: impl Into<String>) -> Result<Self, AdvisoryFailure> {
        Self::with_config(DEFAULT_API_BASE, DEFAULT_MODEL, api_key, REQUEST_TIMEOUT)
    }

    /// Create client with custom configuration
    pub fn with_config(
        base_url: &str,
        model: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AdvisoryFailure> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AdvisoryFailure::Misconfigured("API key is empty".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    /// Create client from the model section of the configuration
    pub fn from_config(config: &ModelConfig) -> Result<Self, AdvisoryFailure> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AdvisoryFailure::Misconfigured(format!("{} is not set", config.api_key_env))
        })?;

        Self::with_config(
            &config.api_base,
            &config.model,
            api_key,
            config.request_timeout(),
        )
    }

    fn generate_url(&self) -> String {
        format!("{}/v1/models/{}:generateContent", self.base_url, self.model)
    }

    /// Check that the model endpoint answers for this key
    pub async fn health_check(&self) -> Result<bool, AdvisoryFailure> {
        let url = format!("{}/v1/models/{}", self.base_url, self.model);

        match self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisoryFailure> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let mut body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(AdvisoryFailure::ApiStatus { status, body });
        }

        let reply: GenerateResponse = response.json().await?;
        reply.into_text()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Stand-in used when no credential is configured; every call fails
#[derive(Debug, Clone)]
pub struct UnavailableModel {
    reason: String,
}

impl UnavailableModel {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl GenerativeModel for UnavailableModel {
    async fn generate(&self, _prompt: &str) -> Result<String, AdvisoryFailure> {
        Err(AdvisoryFailure::Misconfigured(self.reason.clone()))
    }

    fn model_name(&self) -> &str {
        "unavailable"
    }
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

/// generateContent request body
#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenate the text parts of the first candidate
    fn into_text(self) -> Result<String, AdvisoryFailure> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AdvisoryFailure::EmptyReply(format!("prompt blocked: {}", reason)));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AdvisoryFailure::EmptyReply("no candidates".to_string()))?;

        let finish_reason = candidate.finish_reason.unwrap_or_default();
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AdvisoryFailure::EmptyReply(format!(
                "empty candidate (finish reason: {})",
                if finish_reason.is_empty() { "unknown" } else { finish_reason.as_str() }
            )));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new("test-key").unwrap();
        assert_eq!(client.model_name(), DEFAULT_MODEL);
        assert_eq!(client.base_url(), DEFAULT_API_BASE);
    }

    #[test]
    fn test_client_with_config() {
        let client = GeminiClient::with_config(
            "http://localhost:9999/",
            "gemini-test",
            "k",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(client.model_name(), "gemini-test");
        assert_eq!(
            client.generate_url(),
            "http://localhost:9999/v1/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = GeminiClient::new("  ");
        assert!(matches!(result, Err(AdvisoryFailure::Misconfigured(_))));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = ModelConfig::default();
        let result = GeminiClient::from_config(&config);
        assert!(matches!(result, Err(AdvisoryFailure::Misconfigured(_))));
    }

    #[test]
    fn test_response_text_concatenated() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}],"role":"model"},"finishReason":"STOP"}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_blocked_prompt() {
        let json = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_text(), Err(AdvisoryFailure::EmptyReply(_))));
    }

    #[test]
    fn test_no_candidates() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(response.into_text(), Err(AdvisoryFailure::EmptyReply(_))));
    }

    #[tokio::test]
    async fn test_unavailable_model_fails() {
        let model = UnavailableModel::new("API_KEY_GEMINI is not set");
        let result = model.generate("hola").await;
        assert!(matches!(result, Err(AdvisoryFailure::Misconfigured(_))));
    }

    #[test]
    fn test_truncate_multibyte() {
        let mut s = "ñññ".to_string();
        truncate_at_char_boundary(&mut s, 3);
        assert_eq!(s, "ñ");
    }
}
