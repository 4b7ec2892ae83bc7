//! Terminal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TILLPOINT_BACKEND_URL` - Base URL of the sales backend (e.g. `http://127.0.0.1:5000/api`)
//!
//! ## Optional
//! - `TILLPOINT_API_TOKEN` - Bearer token sent with every backend request
//! - `TILLPOINT_DATA_DIR` - Directory for local storage (default: `.tillpoint`)
//! - `TILLPOINT_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 15)
//! - `TILLPOINT_CATALOG_TTL_SECS` - Product list cache lifetime (default: 30)
//! - `TILLPOINT_ROLLOVER_CHECK_SECS` - Daily counter date check period (default: 60)
//! - `TILLPOINT_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".tillpoint";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CATALOG_TTL_SECS: u64 = 30;
const DEFAULT_ROLLOVER_CHECK_SECS: u64 = 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Terminal application configuration.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Sales backend connection settings
    pub backend: BackendConfig,
    /// Directory holding the cart, counters and receipt settings
    pub data_dir: PathBuf,
    /// How often the daily counters compare their date with today
    pub rollover_check_interval: Duration,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Sales backend configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL every endpoint path is joined onto
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// Lifetime of cached product listings
    pub catalog_ttl: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("catalog_ttl", &self.catalog_ttl)
            .finish()
    }
}

impl BackendConfig {
    /// Configuration with default timeouts for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("TILLPOINT_BACKEND_URL", base_url)?,
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
        })
    }
}

impl TerminalConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let base_url = env.required("TILLPOINT_BACKEND_URL")?;
        let backend = BackendConfig {
            base_url: parse_base_url("TILLPOINT_BACKEND_URL", &base_url)?,
            api_token: env
                .optional("TILLPOINT_API_TOKEN")
                .filter(|t| !t.trim().is_empty())
                .map(SecretString::from),
            request_timeout: Duration::from_secs(
                env.parsed_or("TILLPOINT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            ),
            catalog_ttl: Duration::from_secs(
                env.parsed_or("TILLPOINT_CATALOG_TTL_SECS", DEFAULT_CATALOG_TTL_SECS)?,
            ),
        };

        let rollover_secs: u64 =
            env.parsed_or("TILLPOINT_ROLLOVER_CHECK_SECS", DEFAULT_ROLLOVER_CHECK_SECS)?;
        if rollover_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "TILLPOINT_ROLLOVER_CHECK_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            backend,
            data_dir: PathBuf::from(env.or_default("TILLPOINT_DATA_DIR", DEFAULT_DATA_DIR)),
            rollover_check_interval: Duration::from_secs(rollover_secs),
            log_format: env.parsed_or("TILLPOINT_LOG_FORMAT", LogFormat::Pretty)?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Parse a base URL, forcing a trailing slash so endpoint paths join under it.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
