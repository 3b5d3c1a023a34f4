//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `WEBMCP_HOST` - Bind address (default: 127.0.0.1)
//! - `WEBMCP_PORT` - Listen port (default: 3000)
//! - `WEBMCP_BASE_URL` - Public URL of the shop (default: `http://localhost:3000`)
//! - `WEBMCP_SHOP_NAME` - Shop name shown to agents (default: Shop)
//! - `WEBMCP_CATALOG_PATH` - Catalog seed file (YAML or JSON); empty catalog when unset
//! - `WEBMCP_ENABLED` - Expose the tool endpoints (default: true)
//! - `WEBMCP_CONFIRMATION_TIMEOUT_SECS` - Seconds to wait for a confirmation (default: 120)
//! - `WEBMCP_CHECKOUT_PATH` - Checkout path under the base URL (default: /checkout)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL (permalinks, checkout link, cookie security)
    pub base_url: Url,
    /// Shop name reported by the info endpoint
    pub shop_name: String,
    /// Catalog seed file
    pub catalog_path: Option<PathBuf>,
    /// Whether the tool discovery and invoke endpoints are mounted
    pub tools_enabled: bool,
    /// How long an invocation waits for its confirmation
    pub confirmation_timeout: Duration,
    /// Checkout path joined onto the base URL
    pub checkout_path: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 - 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate (0.0 - 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("WEBMCP_HOST", "127.0.0.1")?;
        let port = parse_env("WEBMCP_PORT", "3000")?;
        let base_url = parse_env("WEBMCP_BASE_URL", "http://localhost:3000")?;
        let shop_name = get_env_or_default("WEBMCP_SHOP_NAME", "Shop");
        let catalog_path = get_optional_env("WEBMCP_CATALOG_PATH").map(PathBuf::from);
        let tools_enabled = parse_bool("WEBMCP_ENABLED", true)?;

        let timeout_secs: u64 = parse_env("WEBMCP_CONFIRMATION_TIMEOUT_SECS", "120")?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "WEBMCP_CONFIRMATION_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let checkout_path = get_env_or_default("WEBMCP_CHECKOUT_PATH", "/checkout");

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_env("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            host,
            port,
            base_url,
            shop_name,
            catalog_path,
            tools_enabled,
            confirmation_timeout: Duration::from_secs(timeout_secs),
            checkout_path,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for tests and embedding: defaults, no Sentry, no catalog.
    #[must_use]
    pub fn local(base_url: Url) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url,
            shop_name: "Shop".to_string(),
            catalog_path: None,
            tools_enabled: true,
            confirmation_timeout: Duration::from_secs(120),
            checkout_path: "/checkout".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn public_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Absolute checkout URL.
    #[must_use]
    pub fn checkout_url(&self) -> String {
        format!(
            "{}/{}",
            self.public_url(),
            self.checkout_path.trim_start_matches('/')
        )
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`/`yes`/`no`).
fn parse_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |value| parse_flag(key, &value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}
