// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration handling for clarabot
//!
//! Loaded from YAML by default, or TOML when the file extension is `.toml`.
//! Every field has a serde default so partial files are accepted.

use crate::error::{ClarabotError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory names skipped by directory scans, in addition to dot-directories
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Contrast scan settings
    #[serde(default)]
    pub contrast: ContrastConfig,

    /// Readability target and rewrite budget
    #[serde(default)]
    pub readability: ReadabilityConfig,

    /// Remote (AI) rewrite collaborator
    #[serde(default)]
    pub remote: RemoteConfig,

    /// URL fetch collaborator
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            contrast: ContrastConfig::default(),
            readability: ReadabilityConfig::default(),
            remote: RemoteConfig::default(),
            fetch: FetchConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Contrast scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContrastConfig {
    /// Maximum number of findings recorded per document
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self { limit: default_limit() }
    }
}

fn default_limit() -> usize {
    30
}

/// Readability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadabilityConfig {
    /// Target Flesch-Kincaid grade for reports and rewrites
    #[serde(default = "default_target_grade")]
    pub target_grade: f64,

    /// Maximum rewrite passes
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for ReadabilityConfig {
    fn default() -> Self {
        Self {
            target_grade: default_target_grade(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_target_grade() -> f64 {
    6.0
}

fn default_max_iterations() -> usize {
    5
}

/// Remote rewrite configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL, without the `/chat/completions` suffix
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name sent with each request
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key. The key itself is never stored.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// URL fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with page requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("clarabot/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_exclude() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        "target".to_string(),
        "dist".to_string(),
        "build".to_string(),
        "vendor".to_string(),
    ]
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("toml")
}

/// Load configuration from a path, falling back to defaults when it does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;

    let config: Config = if is_toml(path) {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    if config.contrast.limit == 0 {
        return Err(ClarabotError::Config("contrast.limit must be at least 1".to_string()));
    }

    debug!(?config, "Loaded configuration");
    Ok(config)
}

/// Get the default config path
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clarabot")
        .join("config.yml")
}

/// Write default configuration to a file
pub fn write_default_config(path: &Path) -> Result<()> {
    let config = Config::default();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if is_toml(path) {
        toml::to_string_pretty(&config)?
    } else {
        serde_yaml::to_string(&config)?
    };

    std::fs::write(path, content)?;
    Ok(())
}
