//! Configuration loading — TOML file, `.env` file, then environment
//! variable overrides.
//!
//! Looks for `gitautomata.toml` in the working directory unless another path
//! is given on the command line. Every field has a sensible default so the
//! file is optional. Environment variables take precedence over file values.

use serde::Deserialize;

use gitautomata_adapter_github_reqwest::GitHubConfig;
use gitautomata_adapter_http_axum::config::{CorsConfig, WebhookConfig};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "gitautomata.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// GitHub API client settings.
    pub github: GitHubConfig,
    /// Webhook endpoint settings.
    pub webhook: WebhookConfig,
    /// Cross-origin settings.
    pub cors: CorsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Built-in automations to register.
    pub automations: AutomationsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AutomationsConfig {
    /// Names of the built-in automations registered at startup.
    pub enabled: Vec<String>,
}

impl Config {
    /// Load configuration from `path` (if present), read a `.env` file (if
    /// present) then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid. A missing or unreadable `.env`
    /// file is ignored.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        dotenvy::dotenv().ok();
        config.apply_env_overrides_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides read through `lookup` (normally the process
    /// environment).
    fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("GITHUB_TOKEN") {
            self.github.token = Some(val);
        }
        if let Some(val) = lookup("GITHUB_API_URL") {
            self.github.api_url = val;
        }
        if let Some(val) = lookup("GITHUB_API_VERSION") {
            self.github.api_version = val;
        }
        if let Some(val) = lookup("WEBHOOK_SECRET") {
            self.webhook.secret = Some(val);
        }
        if let Some(val) = lookup("WEBHOOK_PATH") {
            self.webhook.path = val;
        }
        if let Some(val) = lookup("GITAUTOMATA_HOST") {
            self.server.host = val;
        }
        if let Some(port) = lookup("GITAUTOMATA_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some((host, port)) = lookup("GITAUTOMATA_BIND")
            .as_deref()
            .and_then(|val| val.rsplit_once(':'))
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("CORS_ORIGIN") {
            self.cors.origin = val;
        }
        if let Some(val) = lookup("GITAUTOMATA_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        self.webhook
            .validate_path()
            .map_err(|err| ConfigError::Validation(err.to_string()))
    }

    /// Ensure a GitHub token is available, as required by commands that talk
    /// to the real API.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when no non-blank token is set.
    pub fn require_token(&self) -> Result<(), ConfigError> {
        match self.github.token() {
            Some(_) => Ok(()),
            None => Err(ConfigError::Validation(
                "GITHUB_TOKEN is required (set it in the environment or [github] token)"
                    .to_string(),
            )),
        }
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "gitautomata=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for AutomationsConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["hello-world".to_string(), "auto-label".to_string()],
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
