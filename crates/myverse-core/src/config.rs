use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::MyverseError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "MYVERSE_API_URL";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Also write a daily rolling log file into the data directory.
    pub file: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        AppConfig::default().api
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        AppConfig::default().logging
    }
}

impl AppConfig {
    /// Load config: user file (if exists) over built-in defaults, then the
    /// environment override for the API URL.
    pub fn load() -> Result<Self, MyverseError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Load from an explicit path, falling back to defaults when it is absent.
    pub fn load_from(path: &std::path::Path) -> Result<Self, MyverseError> {
        if !path.exists() {
            return Self::defaults();
        }
        let user_str =
            std::fs::read_to_string(path).map_err(|e| MyverseError::Config(e.to_string()))?;
        toml::from_str(&user_str).map_err(|e| MyverseError::Config(e.to_string()))
    }

    fn defaults() -> Result<Self, MyverseError> {
        toml::from_str(DEFAULT_CONFIG).map_err(|e| MyverseError::Config(e.to_string()))
    }

    fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!(%url, "API base URL overridden from environment");
            self.api.base_url = url;
        }
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), MyverseError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MyverseError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the session database file.
    pub fn db_path() -> PathBuf {
        Self::data_dir().join("session.db")
    }

    /// Directory for the session database and log files.
    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path() -> Result<PathBuf, MyverseError> {
        let path = Self::db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "myverse")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
