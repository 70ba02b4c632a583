//! Base LLM trait.
//!
//! Every model backend implements [`BaseLLM`]. The crew only needs a plain
//! chat call: a list of role/content messages in, the assistant text out.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    /// Role of the message sender ("system", "user", "assistant").
    pub role: String,
    /// Content of the message.
    pub content: String,
}

impl LLMMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by LLM backends.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key configured for a provider that requires one.
    #[error("{provider} API key not set. Set OPENAI_API_KEY or configure an api_key.")]
    MissingApiKey { provider: String },

    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("{provider} API error ({status}): {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// The response did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The request timeout is not a usable duration.
    #[error("Invalid request timeout: {0} seconds")]
    InvalidTimeout(f64),

    /// The blocking call could not start its runtime.
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// The backend does not implement this call style.
    #[error("{0}")]
    Unsupported(String),
}

// ---------------------------------------------------------------------------
// BaseLLM trait
// ---------------------------------------------------------------------------

/// Interface every LLM backend implements.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Model identifier.
    fn model(&self) -> &str;

    /// Provider name, used in log lines.
    fn provider(&self) -> &str {
        "custom"
    }

    /// Call the model and block until the assistant reply is available.
    fn call(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError>;

    /// Call the model asynchronously.
    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
        let _ = messages;
        Err(LlmError::Unsupported(format!(
            "Async call not implemented for model '{}'",
            self.model()
        )))
    }
}

/// Builds an LLM for a model name.
///
/// The engine asks the factory for the default model, for per-agent
/// overrides and for the evaluation model of `test`.
pub type LlmFactory = Box<dyn Fn(&str) -> Result<Box<dyn BaseLLM>, LlmError> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl BaseLLM for Echo {
        fn model(&self) -> &str {
            "echo"
        }

        fn call(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
            Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(LLMMessage::system("s").role, "system");
        assert_eq!(LLMMessage::user("u").role, "user");
    }

    #[test]
    fn test_default_acall_is_unsupported() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt.block_on(Echo.acall(vec![LLMMessage::user("hi")])).unwrap_err();
        assert!(matches!(err, LlmError::Unsupported(_)));
    }

    #[test]
    fn test_call() {
        let reply = Echo.call(vec![LLMMessage::user("hi")]).unwrap();
        assert_eq!(reply, "hi");
        assert_eq!(Echo.provider(), "custom");
    }
}
