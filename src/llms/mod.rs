//! LLM backends for crew agents.
//!
//! - [`base_llm`] - the [`BaseLLM`] trait, messages and errors
//! - [`providers`] - concrete providers

pub mod base_llm;
pub mod providers;

pub use base_llm::{BaseLLM, LLMMessage, LlmError, LlmFactory};

use providers::openai::OpenAICompletion;

use crate::utilities::config::Settings;

/// Strip an `openai/` provider prefix from a model name.
pub fn normalize_model_name(model: &str) -> &str {
    model.strip_prefix("openai/").unwrap_or(model)
}

/// Factory producing OpenAI-compatible clients that share the key, base URL,
/// organization and timeout from `settings`.
pub fn openai_factory(settings: &Settings) -> LlmFactory {
    let api_key = settings.api_key.clone();
    let base_url = settings.base_url.clone();
    let organization = settings.organization.clone();
    let timeout = settings.timeout_secs;
    Box::new(move |model: &str| {
        let llm = OpenAICompletion::new(
            normalize_model_name(model),
            api_key.clone(),
            base_url.clone(),
        )
        .organization(organization.clone())
        .timeout(timeout);
        Ok(Box::new(llm) as Box<dyn BaseLLM>)
    })
}
