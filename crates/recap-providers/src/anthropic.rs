//! Anthropic API provider.
//!
//! Calls the Anthropic Messages API directly.

use async_trait::async_trait;
use recap_core::{config::AnthropicConfig, error::RecapError, traits::Provider};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicProvider {
    /// Create from config values.
    pub fn from_config(config: &AnthropicConfig, max_tokens: u32, temperature: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens,
            temperature,
        }
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<AnthropicMessage>,
}

#[derive(Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Option<Vec<AnthropicContentBlock>>,
    model: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Concatenated text blocks, `None` when nothing but whitespace came back.
fn extract_text(resp: &AnthropicResponse) -> Option<String> {
    let text: String = resp
        .content
        .as_ref()?
        .iter()
        .map(|b| b.text.as_str())
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &str) -> Result<String, RecapError> {
        let start = Instant::now();
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        debug!("anthropic: POST {ANTHROPIC_API_URL} model={}", self.model);

        let resp = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RecapError::Provider(format!("anthropic request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(RecapError::Provider(format!(
                "anthropic returned {status}: {text}"
            )));
        }

        let parsed: AnthropicResponse = resp.json().await.map_err(|e| {
            RecapError::Provider(format!("anthropic: failed to parse response: {e}"))
        })?;

        let text = extract_text(&parsed)
            .ok_or_else(|| RecapError::Provider("anthropic: empty completion".into()))?;

        debug!(
            "anthropic: model={}, tokens={:?}, {}ms",
            parsed.model.as_deref().unwrap_or(&self.model),
            parsed
                .usage
                .as_ref()
                .map(|u| u.input_tokens + u.output_tokens),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("anthropic: no API key configured");
            return false;
        }
        // No lightweight health endpoint; we trust the key is valid.
        true
    }
}
