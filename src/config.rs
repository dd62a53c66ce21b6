//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::query::{SortDirection, Table};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub builder: BuilderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8085
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Interactive builder configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuilderConfig {
    /// Table a fresh draft starts with
    #[serde(default = "default_table")]
    pub default_table: Table,

    /// Direction used when ORDER BY is set without one
    #[serde(default)]
    pub default_order: SortDirection,

    /// Clear the terminal before each screen
    #[serde(default = "default_true")]
    pub clear_screen: bool,

    /// Offer copying queries to the system clipboard
    #[serde(default = "default_true")]
    pub clipboard: bool,
}

fn default_table() -> Table {
    Table::Events
}

fn default_true() -> bool {
    true
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            default_table: default_table(),
            default_order: SortDirection::default(),
            clear_screen: default_true(),
            clipboard: default_true(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Candidate config files, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("aql-builder").join("config.toml")),
            Some(PathBuf::from("/etc/aql-builder/config.toml")),
            Some(PathBuf::from("./aql-builder.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in Self::default_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Load an explicit file if given, otherwise the default locations
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup; unparsable values are ignored
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = lookup("AQL_BUILDER_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("AQL_BUILDER_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Builder overrides
        if let Some(table) = lookup("AQL_BUILDER_DEFAULT_TABLE") {
            if let Ok(t) = table.parse() {
                self.builder.default_table = t;
            }
        }
        if let Some(clipboard) = lookup("AQL_BUILDER_CLIPBOARD") {
            if let Some(enabled) = parse_flag(&clipboard) {
                self.builder.clipboard = enabled;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("AQL_BUILDER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("AQL_BUILDER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# AQL Builder Configuration
#
# Environment variables override these settings:
# - AQL_BUILDER_API_HOST
# - AQL_BUILDER_API_PORT
# - AQL_BUILDER_DEFAULT_TABLE
# - AQL_BUILDER_CLIPBOARD
# - AQL_BUILDER_LOG_LEVEL
# - AQL_BUILDER_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8085

# Allowed CORS origins (empty allows any origin)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[builder]
# Table a new query starts from: events or flows
default_table = "events"

# ORDER BY direction when none is chosen: ASC or DESC
default_order = "DESC"

# Clear the terminal between menu screens
clear_screen = true

# Offer copying queries with xclip, xsel or pbcopy
clipboard = true

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/aql-builder/aql-builder.log"
"#
    .to_string()
}
