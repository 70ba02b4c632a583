//! LLM provider implementations.
//!
//! Each provider implements [`BaseLLM`](crate::llms::base_llm::BaseLLM).
//! Only the OpenAI-compatible Chat Completions provider ships; it also
//! covers local servers exposing the same API.

pub mod openai;
