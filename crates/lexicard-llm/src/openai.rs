//! OpenAI-compatible card provider

use crate::prompt::{user_prompt, SYSTEM_PROMPT};
use crate::response::parse_drafts;
use async_trait::async_trait;
use lexicard_core::{CardDraft, EnrichmentProvider, ProviderError, ProviderResult};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    /// Base URL without the `/chat/completions` suffix
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// HTTP-level timeout; the orchestrator applies its own on top
    pub request_timeout: Duration,
}

impl Default for OpenAiCompatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 4096,
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Generates cards through `POST {endpoint}/chat/completions`
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
    name: String,
}

impl OpenAiCompatProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let name = format!("openai-compat:{}", config.model);
        Self {
            client: reqwest::Client::new(),
            config,
            name,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    fn request_body(&self, words: &[String], source_title: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt(words, source_title) },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": { "type": "json_object" },
        })
    }
}

#[async_trait]
impl EnrichmentProvider for OpenAiCompatProvider {
    async fn enrich(&self, words: &[String], source_title: &str) -> ProviderResult<Vec<CardDraft>> {
        let mut request = self
            .client
            .post(self.url())
            .header("Content-Type", "application/json")
            .json(&self.request_body(words, source_title))
            .timeout(self.config.request_timeout);
        if let Some(key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        debug!(words = words.len(), source = source_title, model = %self.config.model, "Requesting cards");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    seconds: self.config.request_timeout.as_secs(),
                }
            } else {
                ProviderError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, error_text));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

        if let Some(refusal) = choice.message.refusal.filter(|r| !r.trim().is_empty()) {
            return Err(ProviderError::Refused(refusal));
        }

        match choice.finish_reason.as_deref() {
            Some("length") => {
                return Err(ProviderError::Truncated(format!(
                    "finish_reason=length after {} words requested",
                    words.len()
                )))
            }
            Some("content_filter") => {
                return Err(ProviderError::Refused("content filter".to_string()))
            }
            _ => {}
        }

        let content = choice.message.content.unwrap_or_default();
        let drafts = parse_drafts(&content, source_title)?;
        if drafts.len() < words.len() {
            warn!(
                requested = words.len(),
                returned = drafts.len(),
                source = source_title,
                "Provider returned fewer cards than requested"
            );
        }
        Ok(drafts)
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

fn status_error(status: StatusCode, body: String) -> ProviderError {
    let detail = format!("{} {}", status.as_u16(), body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(detail),
        _ => ProviderError::Http(detail),
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}
