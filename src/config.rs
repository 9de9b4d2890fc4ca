//! Configuration file parser for ~/.config/healthwire/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning for each one
//! since they are usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
///
/// The custom Debug impl masks `gemini_api_key` so the key never reaches
/// logs or error output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini API key (alternative to the GEMINI_API_KEY env var).
    /// The env var takes precedence.
    pub gemini_api_key: Option<String>,

    /// Base URL of the generative-language API.
    pub gemini_base_url: String,

    /// Model used for summaries, rewrites, sentiment, tips and challenges.
    pub model: String,

    /// Model used for nutritional tips.
    pub nutrition_model: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Minimum spacing between two API requests, in milliseconds.
    pub min_request_interval_ms: u64,

    /// Maximum number of summaries generated concurrently for a feed page.
    pub max_concurrent_requests: usize,

    /// Number of articles per feed page.
    pub page_size: usize,

    /// Alternate article dataset (JSON). The bundled dataset is used when unset.
    pub articles_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            nutrition_model: "gemini-1.5-flash-latest".to_string(),
            request_timeout_secs: 30,
            min_request_interval_ms: 250,
            max_concurrent_requests: 4,
            page_size: 10,
            articles_path: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("gemini_base_url", &self.gemini_base_url)
            .field("model", &self.model)
            .field("nutrition_model", &self.nutrition_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("min_request_interval_ms", &self.min_request_interval_ms)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("page_size", &self.page_size)
            .field("articles_path", &self.articles_path)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 9] = [
        "gemini_api_key",
        "gemini_base_url",
        "model",
        "nutrition_model",
        "request_timeout_secs",
        "min_request_interval_ms",
        "max_concurrent_requests",
        "page_size",
        "articles_path",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), model = %config.model, "Loaded configuration");
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
