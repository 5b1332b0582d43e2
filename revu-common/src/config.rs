//! Bootstrap configuration loading
//!
//! Configuration file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `REVU_CONFIG` environment variable
//! 3. Per-user config file (`~/.config/revu/<module>.toml`)
//! 4. Built-in defaults (fallback)
//!
//! A missing file never prevents startup; a file that exists but does not
//! parse does.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "REVU_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Review record storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// SQLite database file; defaults to the per-user data directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Database path, falling back to the OS-dependent default
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// Sentiment classification provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProvider {
    /// Built-in word-list classifier
    #[default]
    Lexicon,
    /// External HTTP classification endpoint
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub provider: ClassifierProvider,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierProvider::default(),
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Notification sink kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Write notifications to the service log
    #[default]
    Log,
    /// POST notifications to a webhook
    Webhook,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub sink: SinkKind,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            webhook_url: None,
            topic: default_topic(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Bounded exponential backoff applied to every external call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5790
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_topic() -> String {
    "negative-reviews".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("revu").join("reviews.db"))
        .unwrap_or_else(|| PathBuf::from("./revu_data/reviews.db"))
}

/// Per-user config file path for a module
pub fn user_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("revu").join(format!("{}.toml", module_name)))
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Resolve and load configuration for a module
    ///
    /// Returns the loaded configuration together with the file it came
    /// from, or built-in defaults and `None` when no file is found. Nothing
    /// is logged here: services resolve configuration before tracing is up.
    /// Cross-field checks are left to [`TomlConfig::validate`] so command-line
    /// overrides can be applied first.
    pub fn resolve(module_name: &str, cli_arg: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        match resolve_config_file(module_name, cli_arg) {
            Some(path) => {
                let config = Self::load(&path)?;
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Check cross-field requirements that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.classifier.provider == ClassifierProvider::Http
            && self.classifier.endpoint.as_deref().map_or(true, str::is_empty)
        {
            return Err(Error::Config(
                "classifier.provider = \"http\" requires classifier.endpoint".to_string(),
            ));
        }

        if self.notifications.sink == SinkKind::Webhook
            && self.notifications.webhook_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(Error::Config(
                "notifications.sink = \"webhook\" requires notifications.webhook_url".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be at least 1".to_string()));
        }

        Ok(())
    }
}

/// Find the config file to load, if any
///
/// An explicit CLI or environment path is returned even when it does not
/// exist, so that a typo surfaces as an error instead of silent defaults.
pub fn resolve_config_file(module_name: &str, cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config file, only if present
    user_config_path(module_name).filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 5790);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.classifier.provider, ClassifierProvider::Lexicon);
        assert_eq!(config.notifications.sink, SinkKind::Log);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_keep_field_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff(), Duration::from_millis(100));
        assert_eq!(config.retry.max_backoff(), Duration::from_millis(2000));
    }

    #[test]
    fn test_http_classifier_requires_endpoint() {
        let config = TomlConfig::from_toml_str("[classifier]\nprovider = \"http\"\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_webhook_sink_requires_url() {
        let config = TomlConfig::from_toml_str("[notifications]\nsink = \"webhook\"\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = TomlConfig::from_toml_str("[retry]\nmax_attempts = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let result = TomlConfig::from_toml_str("[storage]\nbackend = \"dynamo\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
