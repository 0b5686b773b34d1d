//! Configuration loading, validation, and management for Taskhawk.
//!
//! Loads configuration from `taskhawk.toml` in the working directory (or
//! `~/.taskhawk/config.toml` as a fallback) with environment variable
//! overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `taskhawk.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model, used for both roles unless overridden in `[session]`
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Session configuration (roles, turn budget)
    #[serde(default)]
    pub session: SessionConfig,

    /// Retry loop configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    4000
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("session", &self.session)
            .field("retry", &self.retry)
            .field("tools", &self.tools)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Session configuration: role names, per-role models, budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the instructing role
    #[serde(default = "default_user_role")]
    pub user_role: String,

    /// Name of the tool-using role
    #[serde(default = "default_assistant_role")]
    pub assistant_role: String,

    /// Maximum user/assistant turns per session
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Maximum tool-call rounds inside a single assistant turn
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Model for the instructing role (falls back to `default_model`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_model: Option<String>,

    /// Model for the tool-using role (falls back to `default_model`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_model: Option<String>,
}

fn default_user_role() -> String {
    "user".into()
}
fn default_assistant_role() -> String {
    "assistant".into()
}
fn default_max_turns() -> u32 {
    15
}
fn default_max_tool_rounds() -> u32 {
    8
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_role: default_user_role(),
            assistant_role: default_assistant_role(),
            max_turns: default_max_turns(),
            max_tool_rounds: default_max_tool_rounds(),
            user_model: None,
            assistant_model: None,
        }
    }
}

/// Retry loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts, in seconds (no backoff)
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,

    /// Optional per-attempt deadline, in seconds. `None` = no deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_timeout_secs: Option<u64>,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_delay_secs() -> u64 {
    10
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_delay_secs(),
            attempt_timeout_secs: None,
        }
    }
}

/// Tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Directory where file-writing tools persist artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Shell commands the exec toolkit may run
    #[serde(default = "default_shell_allowlist")]
    pub shell_allowlist: Vec<String>,

    /// Per-request timeout for tool HTTP calls, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Maximum web search results to return
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,
}

fn default_output_dir() -> String {
    "./".into()
}
fn default_shell_allowlist() -> Vec<String> {
    ["ls", "cat", "head", "tail", "echo", "pwd", "date", "wc", "grep", "python3"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_http_timeout_secs() -> u64 {
    30
}
fn default_max_search_results() -> usize {
    5
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            shell_allowlist: default_shell_allowlist(),
            http_timeout_secs: default_http_timeout_secs(),
            max_search_results: default_max_search_results(),
        }
    }
}

/// Per-provider configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for this provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Default model for this provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration, checking `./taskhawk.toml` then
    /// `~/.taskhawk/config.toml`.
    ///
    /// Environment variable overrides (highest priority):
    /// - `TASKHAWK_API_KEY`, `OPENAI_API_KEY` — API key
    /// - `TASKHAWK_PROVIDER` — default provider
    /// - `TASKHAWK_MODEL` — default model
    pub fn load() -> Result<Self, ConfigError> {
        let local = PathBuf::from("taskhawk.toml");
        let path = if local.exists() {
            local
        } else {
            Self::config_dir().join("config.toml")
        };
        let mut config = Self::load_from(&path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("TASKHAWK_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }
        if let Ok(provider) = std::env::var("TASKHAWK_PROVIDER") {
            config.default_provider = provider;
        }
        if let Ok(model) = std::env::var("TASKHAWK_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".taskhawk")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.session.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_turns must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Check if an API key is available for the active provider.
    ///
    /// A key can come from the top level (config file or environment) or
    /// from the active provider's `[providers.<name>]` section — the same
    /// resolution the provider builder uses.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Model for the instructing role.
    pub fn user_model(&self) -> &str {
        self.session.user_model.as_deref().unwrap_or(&self.default_model)
    }

    /// Model for the tool-using role.
    pub fn assistant_model(&self) -> &str {
        self.session
            .assistant_model
            .as_deref()
            .unwrap_or(&self.default_model)
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            session: SessionConfig::default(),
            retry: RetryConfig::default(),
            tools: ToolsConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
