//! LLM module - language model integrations
//!
//! Provides the provider abstraction with Ollama as the primary backend.

pub mod ollama;
pub mod traits;

pub use ollama::OllamaClient;
pub use traits::{GenerateOptions, LlmProvider, LlmResponse, TokenUsage};
