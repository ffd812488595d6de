//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Which backend deployment to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_development_url")]
    pub development_url: String,

    #[serde(default = "default_production_url")]
    pub production_url: String,

    /// Explicit base URL, wins over the environment switch
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_development_url() -> String {
    "http://localhost:8081/api".to_string()
}

fn default_production_url() -> String {
    "https://diettracker.app/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    crate::api::DEFAULT_PAGE_SIZE
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            development_url: default_development_url(),
            production_url: default_production_url(),
            base_url: None,
            request_timeout_secs: default_request_timeout(),
            page_size: default_page_size(),
        }
    }
}

impl ApiConfig {
    /// Effective base URL, without trailing slash
    pub fn resolved_base_url(&self) -> String {
        let url = match (&self.base_url, self.environment) {
            (Some(url), _) if !url.trim().is_empty() => url.as_str(),
            (_, Environment::Development) => self.development_url.as_str(),
            (_, Environment::Production) => self.production_url.as_str(),
        };
        url.trim().trim_end_matches('/').to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    dirs::data_local_dir()
        .map(|p| {
            p.join("diet-tracker")
                .join("storage.json")
                .to_string_lossy()
                .to_string()
        })
        .unwrap_or_else(|| "./diet_tracker_storage.json".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    /// Store path with a leading `~/` expanded to the home directory
    pub fn resolved_path(&self) -> PathBuf {
        match (self.path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.path),
        }
    }
}

/// Client-side cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Staleness window for the forum post cache
    #[serde(default = "default_post_ttl")]
    pub post_ttl_secs: u64,
}

fn default_post_ttl() -> u64 {
    300 // 5 minutes
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            post_ttl_secs: default_post_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn post_ttl(&self) -> Duration {
        Duration::from_secs(self.post_ttl_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Fallback language when none is stored
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
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

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
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

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("diet-tracker").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, var: F) {
        // API overrides
        if let Some(env) = var("DIET_TRACKER_ENV") {
            match Environment::parse(&env) {
                Some(e) => self.api.environment = e,
                None => tracing::warn!("Ignoring unknown DIET_TRACKER_ENV value: {}", env),
            }
        }
        if let Some(url) = var("DIET_TRACKER_API_URL") {
            self.api.base_url = Some(url);
        }

        // Storage overrides
        if let Some(path) = var("DIET_TRACKER_STORAGE_PATH") {
            self.storage.path = path;
        }

        // Logging overrides
        if let Some(level) = var("DIET_TRACKER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("DIET_TRACKER_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Some(language) = var("DIET_TRACKER_LANGUAGE") {
            self.ui.language = language;
        }
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
    r#"# Diet Tracker Configuration
#
# Environment variables override these settings:
# - DIET_TRACKER_ENV (development | production)
# - DIET_TRACKER_API_URL
# - DIET_TRACKER_STORAGE_PATH
# - DIET_TRACKER_LOG_LEVEL
# - DIET_TRACKER_LOG_FORMAT
# - DIET_TRACKER_LANGUAGE

[api]
# Which deployment to use: development or production
environment = "development"

# Base URLs per deployment
development_url = "http://localhost:8081/api"
production_url = "https://diettracker.app/api"

# Explicit base URL (overrides the environment switch)
# base_url = "http://192.168.1.20:8081/api"

# Request timeout in seconds
request_timeout_secs = 30

# Items per page for list views
page_size = 10

[storage]
# Local key-value store (liked posts, language, session tokens)
path = "~/.local/share/diet-tracker/storage.json"

[cache]
# How long cached forum pages stay fresh (seconds)
post_ttl_secs = 300

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json
format = "pretty"

[ui]
# Language used when none has been chosen: en, tr
language = "en"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.environment, Environment::Development);
        assert_eq!(config.api.resolved_base_url(), "http://localhost:8081/api");
        assert_eq!(config.cache.post_ttl_secs, 300);
        assert_eq!(config.api.page_size, 10);
    }

    #[test]
    fn test_environment_switch() {
        let mut api = ApiConfig::default();
        api.environment = Environment::Production;
        assert_eq!(api.resolved_base_url(), "https://diettracker.app/api");

        api.base_url = Some("http://10.0.0.5:9000/api/".to_string());
        assert_eq!(api.resolved_base_url(), "http://10.0.0.5:9000/api");
    }

    #[test]
    fn test_generated_config_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, generate_default_config()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.ui.language, "en");
        assert!(config.api.base_url.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("[api]\nenvironment = \"production\"\n").unwrap();
        assert_eq!(config.api.environment, Environment::Production);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DIET_TRACKER_ENV", "prod"),
            ("DIET_TRACKER_STORAGE_PATH", "/tmp/store.json"),
            ("DIET_TRACKER_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.environment, Environment::Production);
        assert_eq!(config.storage.path, "/tmp/store.json");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_storage_path_plain() {
        let storage = StorageConfig {
            path: "/var/lib/diet/storage.json".to_string(),
        };
        assert_eq!(storage.resolved_path(), PathBuf::from("/var/lib/diet/storage.json"));
    }

    #[test]
    fn test_missing_file_error() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
