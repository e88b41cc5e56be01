//! Configuration loading, validation, and management for Cartwright.
//!
//! Loads configuration from `~/.cartwright/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.cartwright/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Persistent store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Session defaults
    #[serde(default)]
    pub session: SessionConfig,

    /// Turn orchestration limits
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Built-in hook toggles
    #[serde(default)]
    pub hooks: HooksConfig,
}

/// Which store backend to open and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "file" or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Snapshot file for the "file" backend
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_backend() -> String {
    "file".into()
}
fn default_store_path() -> PathBuf {
    AppConfig::config_dir().join("database.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// User id used when none is given on the command line
    #[serde(default = "default_user")]
    pub default_user: String,
}

fn default_user() -> String {
    "user-123".into()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_user: default_user(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum model round-trips with tool calls per turn
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,
}

fn default_max_tool_iterations() -> u32 {
    25
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: default_max_tool_iterations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Emit a log line before and after every tool call
    #[serde(default = "default_true")]
    pub log_tool_calls: bool,
}

fn default_true() -> bool {
    true
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            log_tool_calls: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.cartwright/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `CARTWRIGHT_STORE_PATH`
    /// - `CARTWRIGHT_STORE_BACKEND`
    /// - `CARTWRIGHT_USER`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
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

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CARTWRIGHT_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Ok(backend) = std::env::var("CARTWRIGHT_STORE_BACKEND") {
            self.store.backend = backend;
        }
        if let Ok(user) = std::env::var("CARTWRIGHT_USER") {
            self.session.default_user = user;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cartwright")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.store.backend.as_str(), "file" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "store.backend must be \"file\" or \"memory\", got \"{}\"",
                self.store.backend
            )));
        }

        if self.store.backend == "file" && self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.path must be set for the file backend".into(),
            ));
        }

        if self.session.default_user.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "session.default_user must not be empty".into(),
            ));
        }

        if self.orchestrator.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "orchestrator.max_tool_iterations must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
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
