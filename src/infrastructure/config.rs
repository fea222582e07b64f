//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional TOML/JSON file, then `USER_FETCHER__SECTION__KEY` environment
//! variables (e.g. `USER_FETCHER__CREDENTIALS__PASSWORD`).

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::infrastructure::parsing::ParsingConfig;

/// Prefix of environment variables overriding file settings
pub const ENV_PREFIX: &str = "USER_FETCHER";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoints: EndpointConfig,
    pub credentials: CredentialsConfig,
    pub workers: WorkerConfig,
    pub parsing: ParsingConfig,
    pub logging: LoggingConfig,
}

/// The two fixed endpoints of the target application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub login_url: String,
    pub query_url: String,
}

/// Login credentials; normally supplied through the environment
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Worker configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum fetch invocations in flight at once
    pub max_concurrent: usize,

    /// Timeout applied to every network call, in seconds
    pub request_timeout_seconds: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Global request rate limit; 0 disables limiting
    pub max_requests_per_second: u32,
}

impl WorkerConfig {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            login_url: defaults::LOGIN_URL.to_string(),
            query_url: defaults::QUERY_URL.to_string(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::MAX_CONCURRENT_FETCHES,
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl AppConfig {
    /// Default config file location under the user config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bulk-user-fetcher").join("config.toml"))
    }

    /// Load defaults, then `path` if given (it must exist), then the environment.
    ///
    /// Values are not validated here; callers apply their own overrides first
    /// and then call [`Self::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                info!("Loading configuration from: {:?}", path);
                builder = builder.add_source(config::File::from(path));
            }
            None => {
                if let Some(default_path) = Self::default_path() {
                    builder = builder.add_source(config::File::from(default_path).required(false));
                }
            }
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Check settings for values that would make a batch meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("endpoints.login_url", &self.endpoints.login_url),
            ("endpoints.query_url", &self.endpoints.query_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| ConfigError::validation(format!("{name} '{value}' is not a valid URL: {e}")))?;
        }

        if self.workers.max_concurrent == 0 {
            return Err(ConfigError::validation(
                "workers.max_concurrent must be greater than 0",
            ));
        }

        if self.workers.request_timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "workers.request_timeout_seconds must be greater than 0",
            ));
        }

        if self.credentials.username.is_empty() || self.credentials.password.is_empty() {
            return Err(ConfigError::validation(format!(
                "credentials are missing; set {ENV_PREFIX}__CREDENTIALS__USERNAME and {ENV_PREFIX}__CREDENTIALS__PASSWORD"
            )));
        }

        Ok(())
    }
}

/// Default values
pub mod defaults {
    /// Login endpoint of the query application
    pub const LOGIN_URL: &str = "http://webpage.boledragon.com:8080/accounts/login/";

    /// Query endpoint of the query application
    pub const QUERY_URL: &str = "http://webpage.boledragon.com:8080/forever_new/query/";

    /// Default worker pool size
    pub const MAX_CONCURRENT_FETCHES: usize = 10;

    /// Default per-call network timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    /// Rate limiting is off unless configured
    pub const MAX_REQUESTS_PER_SECOND: u32 = 0;

    pub const USER_AGENT: &str = concat!("bulk-user-fetcher/", env!("CARGO_PKG_VERSION"));

    pub const LOG_LEVEL: &str = "info";
}
