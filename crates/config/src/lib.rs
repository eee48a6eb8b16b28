//! Configuration loading, validation, and management for codelore.
//!
//! Loads configuration from `~/.codelore/config.toml` with environment
//! variable overrides. All knobs have hardcoded fallbacks pointed at a
//! local development setup (Ollama + a local Qdrant), so the tool works
//! with an empty environment. Environment state is read exactly once at
//! startup — never from inside the loop.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.codelore/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat/embedding provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Vector store settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Loop behavior settings
    #[serde(default, rename = "loop")]
    pub run: LoopConfig,

    /// Tokenizer settings
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

/// Settings for the OpenAI-compatible completion/embedding service.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key; optional for local endpoints like Ollama
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Chat model identifier
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model identifier
    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_api_url() -> String {
    "http://localhost:11434/v1".into()
}
fn default_chat_model() -> String {
    "llama3.2".into()
}
fn default_embed_model() -> String {
    "nomic-embed-text".into()
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            chat_model: default_chat_model(),
            embed_model: default_embed_model(),
            temperature: default_temperature(),
        }
    }
}

/// Settings for the Qdrant vector store.
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Qdrant base URL
    #[serde(default = "default_qdrant_url")]
    pub url: String,

    /// Qdrant API key; optional for local instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Collection to search
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Maximum snippets per query
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_qdrant_url() -> String {
    "http://localhost:6333".into()
}
fn default_collection() -> String {
    "dimm-city-page".into()
}
fn default_search_limit() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_qdrant_url(),
            api_key: None,
            collection: default_collection(),
            limit: default_search_limit(),
        }
    }
}

/// Settings for the context-augmentation loop itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Iteration ceiling before the forced final call
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Total token window assumed for the model
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Tokens reserved for the response and prompt scaffolding
    #[serde(default = "default_reserved_tokens")]
    pub reserved_tokens: usize,

    /// How directive markers are detected: "substring" or "prefix"
    #[serde(default = "default_directive_mode")]
    pub directive_mode: String,

    /// Path prefixes the FILE: directive must not read. Empty = allow all.
    #[serde(default)]
    pub forbidden_paths: Vec<String>,
}

fn default_max_iterations() -> u32 {
    5
}
fn default_max_tokens() -> usize {
    4096
}
fn default_reserved_tokens() -> usize {
    500
}
fn default_directive_mode() -> String {
    "substring".into()
}

impl LoopConfig {
    /// The context token budget: total window minus the reservation.
    pub fn context_budget(&self) -> usize {
        self.max_tokens.saturating_sub(self.reserved_tokens)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_tokens: default_max_tokens(),
            reserved_tokens: default_reserved_tokens(),
            directive_mode: default_directive_mode(),
            forbidden_paths: vec![],
        }
    }
}

/// Settings for the tokenizer used to measure and trim context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Local path to a `tokenizer.json`; takes precedence when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// HuggingFace Hub repo id to fetch the tokenizer from
    #[serde(default = "default_tokenizer_repo")]
    pub repo: String,
}

fn default_tokenizer_repo() -> String {
    "bert-base-uncased".into()
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            file: None,
            repo: default_tokenizer_repo(),
        }
    }
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
            .field("provider", &self.provider)
            .field("search", &self.search)
            .field("loop", &self.run)
            .field("tokenizer", &self.tokenizer)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("chat_model", &self.chat_model)
            .field("embed_model", &self.embed_model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .field("collection", &self.collection)
            .field("limit", &self.limit)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.codelore/config.toml),
    /// then apply environment variable overrides:
    ///
    /// - `OPENAI_API_URL`, `OPENAI_API_KEY`, `LLM_MODEL`, `EMBED_MODEL`
    /// - `QDRANT_URL`, `QDRANT_API_KEY`, `QDRANT_COLLECTION`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
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

    /// Apply environment variable overrides (highest priority).
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("OPENAI_API_URL") {
            self.provider.api_url = url;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.provider.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.provider.chat_model = model;
        }
        if let Ok(model) = std::env::var("EMBED_MODEL") {
            self.provider.embed_model = model;
        }
        if let Ok(url) = std::env::var("QDRANT_URL") {
            self.search.url = url;
        }
        if let Ok(key) = std::env::var("QDRANT_API_KEY") {
            self.search.api_key = Some(key);
        }
        if let Ok(collection) = std::env::var("QDRANT_COLLECTION") {
            self.search.collection = collection;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".codelore")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.temperature < 0.0 || self.provider.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.run.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "loop.max_iterations must be positive".into(),
            ));
        }

        if self.run.reserved_tokens >= self.run.max_tokens {
            return Err(ConfigError::ValidationError(
                "loop.reserved_tokens must be smaller than loop.max_tokens".into(),
            ));
        }

        match self.run.directive_mode.as_str() {
            "substring" | "prefix" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "loop.directive_mode must be \"substring\" or \"prefix\", got \"{other}\""
                )));
            }
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            search: SearchConfig::default(),
            run: LoopConfig::default(),
            tokenizer: TokenizerConfig::default(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.provider.chat_model, "llama3.2");
        assert_eq!(config.search.url, "http://localhost:6333");
        assert_eq!(config.run.max_iterations, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn context_budget_subtracts_reservation() {
        let config = LoopConfig::default();
        assert_eq!(config.context_budget(), 4096 - 500);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider.chat_model, config.provider.chat_model);
        assert_eq!(parsed.search.collection, config.search.collection);
        assert_eq!(parsed.run.max_tokens, config.run.max_tokens);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            provider: ProviderConfig {
                temperature: 5.0,
                ..ProviderConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_iterations_rejected() {
        let config = AppConfig {
            run: LoopConfig {
                max_iterations: 0,
                ..LoopConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn reservation_must_fit_window() {
        let config = AppConfig {
            run: LoopConfig {
                max_tokens: 100,
                reserved_tokens: 100,
                ..LoopConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_directive_mode_rejected() {
        let config = AppConfig {
            run: LoopConfig {
                directive_mode: "regex".into(),
                ..LoopConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_file_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[search]
collection = "my-project-pages"
limit = 3
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.search.collection, "my-project-pages");
        assert_eq!(config.search.limit, 3);
    }

    #[test]
    fn broken_config_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[provider\nnot toml").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.search.collection, "dimm-city-page");
    }

    #[test]
    fn partial_config_file_fills_defaults() {
        let toml_str = r#"
[provider]
chat_model = "qwen2.5-coder"

[loop]
max_iterations = 3
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.chat_model, "qwen2.5-coder");
        assert_eq!(config.provider.embed_model, "nomic-embed-text");
        assert_eq!(config.run.max_iterations, 3);
        assert_eq!(config.run.max_tokens, 4096);
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig {
            provider: ProviderConfig {
                api_key: Some("sk-very-secret".into()),
                ..ProviderConfig::default()
            },
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
