//! OpenAI-compatible Chat Completions provider.
//!
//! Works against api.openai.com and any server exposing the same
//! `/chat/completions` endpoint (Ollama, vLLM, LM Studio, proxies).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llms::base_llm::{BaseLLM, LLMMessage, LlmError};
use crate::utilities::config::DEFAULT_TIMEOUT_SECS;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "OpenAI";

/// Chat Completions client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAICompletion {
    /// Model name (e.g. "gpt-4o-mini").
    pub model: String,
    /// Bearer token; required by api.openai.com, optional for local servers.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: Option<String>,
    /// Organization header.
    pub organization: Option<String>,
    /// Request timeout in seconds.
    pub timeout: f64,
}

impl OpenAICompletion {
    /// Create a provider for `model`. The key is used as given; resolving it
    /// from the environment is the job of [`Settings`](crate::utilities::config::Settings).
    pub fn new(model: impl Into<String>, api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            model: model.into(),
            api_key,
            base_url,
            organization: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn organization(mut self, organization: Option<String>) -> Self {
        self.organization = organization;
        self
    }

    pub fn timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Whether requests go to the hosted OpenAI API (which needs a key).
    fn is_hosted(&self) -> bool {
        self.api_base_url() == DEFAULT_BASE_URL
    }

    /// Build the request body for the Chat Completions API.
    pub fn build_request_body(&self, messages: &[LLMMessage]) -> Value {
        serde_json::json!({
            "model": self.model,
            "messages": messages,
        })
    }

    /// Extract the assistant text from a Chat Completions response.
    pub fn parse_completions_response(response: &Value) -> Result<String, LlmError> {
        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| LlmError::MalformedResponse("No choices in response".to_string()))?;

        if let Some(usage) = response.get("usage") {
            log::debug!(
                "OpenAI token usage: prompt={}, completion={}, total={}",
                usage.get("prompt_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
                usage.get("completion_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
                usage.get("total_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
            );
        }

        match message.get("content").and_then(|c| c.as_str()) {
            Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
            _ => Err(LlmError::MalformedResponse(
                "Response message has no text content".to_string(),
            )),
        }
    }
}

#[async_trait]
impl BaseLLM for OpenAICompletion {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        PROVIDER
    }

    fn call(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
        log::debug!(
            "OpenAICompletion.call: model={}, messages={}",
            self.model,
            messages.len()
        );
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.acall(messages))
    }

    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
        if self.api_key.is_none() && self.is_hosted() {
            return Err(LlmError::MissingApiKey {
                provider: PROVIDER.to_string(),
            });
        }

        let timeout = Duration::try_from_secs_f64(self.timeout)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or(LlmError::InvalidTimeout(self.timeout))?;

        let endpoint = format!("{}/chat/completions", self.api_base_url());
        let body = self.build_request_body(&messages);

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let mut request = client
            .post(&endpoint)
            .header("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(ref org) = self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Status {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| {
            LlmError::MalformedResponse(format!(
                "{} - Body: {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })?;

        Self::parse_completions_response(&json)
    }
}
