//! OpenAI-compatible API provider.
//!
//! Works with OpenAI's API and any compatible endpoint. Yandex GPT is served
//! through its OpenAI-compatible gateway with the folder id as project header.

use async_trait::async_trait;
use recap_core::{
    config::{OpenAiConfig, YandexConfig},
    error::RecapError,
    traits::Provider,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    project: Option<String>,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    /// Create from config values.
    pub fn from_config(config: &OpenAiConfig, max_tokens: u32, temperature: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            name: "openai".to_string(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            project: None,
            max_tokens,
            temperature,
        }
    }

    /// Yandex GPT via its OpenAI-compatible endpoint.
    pub fn yandex(config: &YandexConfig, max_tokens: u32, temperature: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            name: "yagpt".to_string(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            project: Some(config.project.clone()).filter(|p| !p.is_empty()),
            max_tokens,
            temperature,
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.api_key));
        match &self.project {
            Some(project) => builder.header("OpenAI-Project", project),
            None => builder,
        }
    }
}

/// The summarizer sends one user turn per request.
fn build_request(model: &str, prompt: &str, max_tokens: u32, temperature: f32) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        max_tokens,
        temperature,
    }
}

/// First non-blank choice, if any.
fn extract_text(resp: &ChatCompletionResponse) -> Option<String> {
    resp.choices
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.message.as_ref())
        .map(|m| m.content.clone())
        .filter(|text| !text.trim().is_empty())
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
    model: Option<String>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: Option<u64>,
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &str) -> Result<String, RecapError> {
        let name = &self.name;
        let start = Instant::now();
        let body = build_request(&self.model, prompt, self.max_tokens, self.temperature);

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("{name}: POST {url} model={}", self.model);

        let resp = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RecapError::Provider(format!("{name} request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(RecapError::Provider(format!(
                "{name} returned {status}: {text}"
            )));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| RecapError::Provider(format!("{name}: failed to parse response: {e}")))?;

        let text = extract_text(&parsed)
            .ok_or_else(|| RecapError::Provider(format!("{name}: empty completion")))?;

        debug!(
            "{name}: {} chars, model={}, tokens={:?}, {}ms",
            text.len(),
            parsed.model.as_deref().unwrap_or(&self.model),
            parsed.usage.as_ref().and_then(|u| u.total_tokens),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("{}: no API key configured", self.name);
            return false;
        }
        // Basic check: try to list models.
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        match self.request(reqwest::Method::GET, &url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("{} not available: {e}", self.name);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_name() {
        let config = OpenAiConfig {
            api_key: "sk-test".into(),
            ..Default::default()
        };
        let p = OpenAiProvider::from_config(&config, 2000, 0.7);
        assert_eq!(p.name(), "openai");
        assert!(p.requires_api_key());
        assert!(p.project.is_none());
    }

    #[test]
    fn test_yandex_provider_uses_project() {
        let config = YandexConfig {
            api_key: "y-key".into(),
            model: "gpt://b1g/yandexgpt/latest".into(),
            project: "b1g".into(),
            ..Default::default()
        };
        let p = OpenAiProvider::yandex(&config, 2000, 0.7);
        assert_eq!(p.name(), "yagpt");
        assert_eq!(p.project.as_deref(), Some("b1g"));
        assert!(p.base_url.contains("yandex"));
    }

    #[test]
    fn test_request_serialization() {
        let body = build_request("gpt-4o-mini", "Summarize this", 2000, 0.7);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Summarize this");
    }

    #[test]
    fn test_openai_response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"},"finish_reason":"stop"}],"model":"gpt-4o","usage":{"total_tokens":42,"prompt_tokens":10,"completion_tokens":32}}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(&resp), Some("Hello!".into()));
        assert_eq!(resp.usage.as_ref().and_then(|u| u.total_tokens), Some(42));
    }

    #[test]
    fn test_empty_completion_yields_none() {
        let blank = r#"{"choices":[{"message":{"role":"assistant","content":"   "}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(blank).unwrap();
        assert_eq!(extract_text(&resp), None);

        let no_choices = r#"{"choices":[]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(no_choices).unwrap();
        assert_eq!(extract_text(&resp), None);

        let null_content = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(null_content).unwrap();
        assert_eq!(extract_text(&resp), None);
    }
}
