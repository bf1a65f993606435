//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHOWCASE_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOWCASE_PORT` - Listen port (default: 3000)
//! - `SHOWCASE_BASE_URL` - Public URL; `https` enables secure cookies
//!   (default: <http://localhost:3000>)
//! - `SHOWCASE_DATA_DIR` - Directory holding the JSON state files (default: data)
//! - `SHOWCASE_GEOIP_URL` - Geolocation URL template containing `{ip}`
//!   (default: <https://ipapi.co/{ip}/json/>)
//! - `SHOWCASE_TRUST_PROXY` - Take the client IP from `X-Forwarded-For` /
//!   `X-Real-IP` (default: false)
//! - `SHOWCASE_LOG_JSON` - Emit logs as JSON lines (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3000";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_DATA_DIR: &str = "data";

/// Default geolocation endpoint; `{ip}` is replaced with the visitor IP.
pub const DEFAULT_GEOIP_URL: &str = "https://ipapi.co/{ip}/json/";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Directory for persisted state
    pub data_dir: PathBuf,
    /// Geolocation URL template (contains `{ip}`)
    pub geoip_url: String,
    /// Whether forwarded-for headers are trusted for the client IP
    pub trust_proxy: bool,
    /// Whether logs are written as JSON lines
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of requests traced to Sentry
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
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
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_owned());

        let host = parse_var("SHOWCASE_HOST", &get("SHOWCASE_HOST", DEFAULT_HOST))?;
        let port = parse_var("SHOWCASE_PORT", &get("SHOWCASE_PORT", DEFAULT_PORT))?;
        let base_url = Url::parse(&get("SHOWCASE_BASE_URL", DEFAULT_BASE_URL)).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOWCASE_BASE_URL".to_string(), e.to_string())
        })?;
        let data_dir = PathBuf::from(get("SHOWCASE_DATA_DIR", DEFAULT_DATA_DIR));

        let geoip_url = get("SHOWCASE_GEOIP_URL", DEFAULT_GEOIP_URL);
        if !geoip_url.contains("{ip}") {
            return Err(ConfigError::InvalidEnvVar(
                "SHOWCASE_GEOIP_URL".to_string(),
                "must contain an {ip} placeholder".to_string(),
            ));
        }

        let trust_proxy = parse_bool("SHOWCASE_TRUST_PROXY", var("SHOWCASE_TRUST_PROXY"))?;
        let log_json = parse_bool("SHOWCASE_LOG_JSON", var("SHOWCASE_LOG_JSON"))?;
        let sentry_traces_sample_rate = match var("SENTRY_TRACES_SAMPLE_RATE") {
            Some(raw) => parse_var("SENTRY_TRACES_SAMPLE_RATE", &raw)?,
            None => 0.0,
        };

        Ok(Self {
            host,
            port,
            base_url,
            data_dir,
            geoip_url,
            trust_proxy,
            log_json,
            sentry_dsn: var("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: var("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable value, naming the variable in the error.
fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag; unset means `false`.
fn parse_bool(key: &str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" || v.eq_ignore_ascii_case("yes") => {
            Ok(true)
        }
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" || v.eq_ignore_ascii_case("no") => {
            Ok(false)
        }
        Some(v) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{v}'"),
        )),
    }
}
