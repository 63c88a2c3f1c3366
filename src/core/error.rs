//! Custom error types for webpilot
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for webpilot operations
#[derive(Error, Debug)]
pub enum WebpilotError {
    /// Model backend connection or API errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model not available on the backend
    #[error("Model '{0}' not available in Ollama. Run: ollama pull {0}")]
    ModelNotFound(String),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for webpilot operations
pub type Result<T> = std::result::Result<T, WebpilotError>;

impl WebpilotError {
    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
