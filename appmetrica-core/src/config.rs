//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/appmetrica/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/appmetrica/` (~/.config/appmetrica/)
//! - State/Logs: `$XDG_STATE_HOME/appmetrica/` (~/.local/state/appmetrica/)

use crate::error::{Error, Result};
use crate::types::IdentifierMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// API endpoint and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// Defaults for building imports
    #[serde(default)]
    pub import: ImportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// AppMetrica API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// API root, e.g. `https://api.appmetrica.yandex.ru`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth token sent as `Authorization: OAuth <token>`
    pub oauth_token: Option<String>,

    /// Application post API key required by the import endpoint
    pub post_api_key: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            oauth_token: None,
            post_api_key: None,
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Check that the import endpoint can be called
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("api.base_url must not be empty".to_string()));
        }
        if self.post_api_key.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Config(
                "api.post_api_key is required for event imports".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.appmetrica.yandex.ru".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("appmetrica-rs/{}", env!("CARGO_PKG_VERSION"))
}

/// Import defaults, overridable from the command line
#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Identifier keying each row (`device` or `profile`)
    #[serde(default)]
    pub identifier: IdentifierMode,

    /// Optional columns to include, in row order
    #[serde(default)]
    pub columns: Vec<String>,

    /// Request body chunk size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            identifier: IdentifierMode::default(),
            columns: vec![],
            chunk_size: default_chunk_size(),
        }
    }
}

impl ImportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config(
                "import.chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_chunk_size() -> usize {
    4096
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write log lines to stderr
    #[serde(default)]
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            stderr: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.import.validate()?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/appmetrica/config.toml` (~/.config/appmetrica/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("appmetrica").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/appmetrica/` (~/.local/state/appmetrica/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("appmetrica")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/appmetrica/appmetrica.log` (~/.local/state/appmetrica/appmetrica.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("appmetrica.log")
    }
}
