//! Configuration management for the transit catalog client
//!
//! This module provides unified configuration management with multi-source
//! loading and zero-config defaults. Settings come from, in order of
//! increasing precedence: built-in defaults, a TOML config file, and
//! environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::app::ClientConfig;
use crate::constants::{api, env, files, logging};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog API endpoints
    pub api: ApiConfigToml,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfigToml {
    /// Base URL for the catalog REST API
    pub base_url: String,
    /// Base URL for derived files (route extracts, tiles)
    pub files_base_url: String,
}

impl Default for ApiConfigToml {
    fn default() -> Self {
        Self {
            base_url: api::BASE_URL.to_string(),
            files_base_url: files::BASE_URL.to_string(),
        }
    }
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// TCP keep-alive timeout in seconds (None = disabled)
    pub tcp_keepalive_secs: Option<u64>,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// Maximum connections per host
    pub pool_max_per_host: usize,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        let runtime = ClientConfig::default();
        Self {
            tcp_keepalive_secs: runtime.tcp_keepalive.map(|d| d.as_secs()),
            tcp_nodelay: runtime.tcp_nodelay,
            pool_idle_timeout_secs: runtime.pool_idle_timeout.map(|d| d.as_secs()),
            pool_max_per_host: runtime.pool_max_per_host,
            request_timeout_secs: runtime.request_timeout.as_secs(),
            connect_timeout_secs: runtime.connect_timeout.as_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
            colored_output: true,
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// # Arguments
    ///
    /// * `config_file_override` - Explicit config file path from the CLI
    ///
    /// # Errors
    ///
    /// Returns an error when an explicitly specified config file does not
    /// exist, when a found file fails to parse, or when the resulting
    /// configuration carries an unusable base URL.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let config_path = if let Some(ref path) = config_file_override {
            Some(path.clone())
        } else {
            Self::find_config_file()
        };

        if let Some(path) = config_path {
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                config = Self::load_from_file(&path).await?;
            } else if config_file_override.is_some() {
                return Err(ConfigError::NotFound { path });
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Convert the client section to its runtime form
    pub fn client_config(&self) -> ClientConfig {
        self.client.to_runtime_config()
    }

    /// Apply environment variable overrides to the loaded configuration
    fn apply_env_overrides(&mut self) {
        let api_url = std::env::var(env::API_URL).ok();
        let files_url = std::env::var(env::FILES_URL).ok();
        self.apply_overrides(api_url, files_url);
    }

    /// Apply explicit override values, ignoring empty strings
    fn apply_overrides(&mut self, api_url: Option<String>, files_url: Option<String>) {
        if let Some(value) = api_url.filter(|v| !v.trim().is_empty()) {
            debug!("Overriding API base URL from environment: {}", value);
            self.api.base_url = value;
        }
        if let Some(value) = files_url.filter(|v| !v.trim().is_empty()) {
            debug!("Overriding files base URL from environment: {}", value);
            self.api.files_base_url = value;
        }
    }

    /// Validate the assembled configuration
    fn validate(&self) -> ConfigResult<()> {
        Self::validate_url("api.base_url", &self.api.base_url)?;
        Self::validate_url("api.files_base_url", &self.api.files_base_url)?;
        Ok(())
    }

    /// A base URL must parse and be an http(s) URL; anything else cannot
    /// have endpoint paths appended to it.
    fn validate_url(field: &str, value: &str) -> ConfigResult<()> {
        let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: format!(
                    "unsupported scheme '{}', expected http or https",
                    url.scheme()
                ),
            });
        }
        Ok(())
    }

    /// Find a configuration file in the standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![
            // Project-local config
            PathBuf::from("./transit-catalog.toml"),
            PathBuf::from("./config.toml"),
        ];

        // User config
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("transit-catalog").join("config.toml"));
        }

        // System config (Unix only)
        #[cfg(unix)]
        search_paths.push(PathBuf::from("/etc/transit-catalog/config.toml"));

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &PathBuf) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            tcp_keepalive: self.tcp_keepalive_secs.map(Duration::from_secs),
            tcp_nodelay: self.tcp_nodelay,
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            pool_max_per_host: self.pool_max_per_host,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_default_config_creation() {
        let config = AppConfig::default();

        assert_eq!(config.api.base_url, api::BASE_URL);
        assert_eq!(config.api.files_base_url, files::BASE_URL);
        assert_eq!(config.logging.level, "info");
        assert!(config.client.tcp_nodelay);
    }

    #[tokio::test]
    async fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        // Should fail when explicitly specified
        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_config_loading_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let test_config = r#"
[api]
base_url = "https://api.example.org/v1"

[client]
request_timeout_secs = 5

[logging]
level = "debug"
"#;

        tokio::fs::write(&config_path, test_config).await.unwrap();

        let config = AppConfig::load(Some(config_path)).await.unwrap();

        // Custom values were loaded
        assert_eq!(config.api.base_url, "https://api.example.org/v1");
        assert_eq!(config.client.request_timeout_secs, 5);
        assert_eq!(config.logging.level, "debug");

        // Defaults fill in unspecified values
        assert_eq!(config.api.files_base_url, files::BASE_URL);
        assert!(config.client.tcp_nodelay);
    }

    #[tokio::test]
    async fn test_config_rejects_invalid_base_url() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad_config.toml");

        let test_config = r#"
[api]
base_url = "not a url"
"#;

        tokio::fs::write(&config_path, test_config).await.unwrap();

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[tokio::test]
    async fn test_config_rejects_non_http_base_url() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("mailto_config.toml");

        // Parses as a URL, but no endpoint path can hang off it
        let test_config = r#"
[api]
base_url = "mailto:ops@example.org"
"#;

        tokio::fs::write(&config_path, test_config).await.unwrap();

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[tokio::test]
    async fn test_config_rejects_malformed_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");

        tokio::fs::write(&config_path, "[api\nbase_url = ???")
            .await
            .unwrap();

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_overrides_replace_urls() {
        let mut config = AppConfig::default();
        config.apply_overrides(
            Some("https://staging.example.org/v1".to_string()),
            Some("https://files.staging.example.org".to_string()),
        );

        assert_eq!(config.api.base_url, "https://staging.example.org/v1");
        assert_eq!(
            config.api.files_base_url,
            "https://files.staging.example.org"
        );
    }

    #[test]
    fn test_empty_overrides_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some("  ".to_string()), None);

        assert_eq!(config.api.base_url, api::BASE_URL);
        assert_eq!(config.api.files_base_url, files::BASE_URL);
    }

    #[test]
    fn test_runtime_conversion() {
        let toml_config = ClientConfigToml {
            request_timeout_secs: 45,
            tcp_keepalive_secs: None,
            ..Default::default()
        };

        let runtime = toml_config.to_runtime_config();
        assert_eq!(runtime.request_timeout, Duration::from_secs(45));
        assert!(runtime.tcp_keepalive.is_none());
        assert!(runtime.tcp_nodelay);
    }
}
