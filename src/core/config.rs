//! Configuration management for webpilot
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/webpilot/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, WebpilotError};

/// Main configuration for webpilot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ollama server configuration
    pub ollama: OllamaConfig,
    /// Model configuration
    pub model: ModelConfig,
    /// Agent loop configuration
    pub agent: AgentConfig,
    /// Page grounding configuration
    pub grounding: GroundingConfig,
    /// Browser tool configuration
    pub tools: ToolsConfig,
    /// Browser launch configuration
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Multimodal model used for per-turn decisions
    /// Default: qwen3-vl:8b
    pub name: String,
    /// Sampling temperature for decision calls
    pub temperature: f32,
}

/// Agent loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum decision turns before the task is abandoned
    /// Default: 150
    pub max_steps: usize,
    /// Directory where per-turn screenshots are written, if any
    pub screenshot_dir: Option<PathBuf>,
}

/// Page grounding (element marking) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingConfig {
    /// Marking attempts before giving up on element data for the turn
    pub max_attempts: u32,
    /// Delay between marking attempts in milliseconds
    pub retry_delay_ms: u64,
}

/// Browser tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// How long the Wait tool pauses, in seconds
    pub wait_secs: u64,
    /// Pixels scrolled per Scroll action on the whole window
    pub window_scroll_px: i64,
    /// Pixels scrolled per Scroll action inside an element
    pub element_scroll_px: i64,
    /// URL the Google tool navigates to
    pub search_url: String,
}

/// Browser launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Whether to run the browser without a visible window
    pub headless: bool,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434),
            timeout_secs: 120,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: env::var("WEBPILOT_MODEL").unwrap_or_else(|_| "qwen3-vl:8b".to_string()),
            temperature: 0.1,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: env::var("WEBPILOT_MAX_STEPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(150),
            screenshot_dir: None,
        }
    }
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_delay_ms: 500,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            wait_secs: 5,
            window_scroll_px: 500,
            element_scroll_px: 200,
            search_url: "https://www.google.com/".to_string(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: env::var("WEBPILOT_HEADLESS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            viewport_width: 1280,
            viewport_height: 800,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("webpilot")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Try to load from config file
        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(WebpilotError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| WebpilotError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| WebpilotError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                WebpilotError::config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| WebpilotError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| WebpilotError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get the full Ollama API URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }
}
