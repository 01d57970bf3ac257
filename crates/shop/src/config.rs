//! Shop configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (HTTP mode)
//! - `SHOP_API_URL` - Base URL of the Shop Service (e.g., <https://shop.internal/api>)
//!
//! ## Optional
//! - `SHOP_API_TOKEN` - Bearer token sent to the Shop Service
//! - `SHOP_CURRENCY` - ISO 4217 currency for display (default: THB)
//! - `SHOP_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use stockcart_core::CurrencyCode;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Stockcart configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Shop Service connection, absent when `SHOP_API_URL` is unset
    pub api: Option<ShopApiConfig>,
    /// Currency used to display prices
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Shop Service HTTP configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ShopApiConfig {
    /// Base URL; `/products` and `/checkout` are resolved beneath it
    pub base_url: Url,
    /// Bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ShopApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or the token looks like
    /// a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ShopConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let currency = match lookup("SHOP_CURRENCY") {
            Some(value) => value
                .parse::<CurrencyCode>()
                .map_err(|e| ConfigError::InvalidEnvVar("SHOP_CURRENCY".to_string(), e))?,
            None => CurrencyCode::default(),
        };

        let api = match lookup("SHOP_API_URL") {
            Some(raw) => Some(ShopApiConfig::from_lookup(&raw, &lookup)?),
            None => None,
        };

        Ok(Self {
            api,
            currency,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }

    /// The Shop Service connection settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `SHOP_API_URL` was not set.
    pub fn api(&self) -> Result<&ShopApiConfig, ConfigError> {
        self.api
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOP_API_URL".to_string()))
    }
}

impl ShopApiConfig {
    fn from_lookup(
        raw_url: &str,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(raw_url)?;

        let token = match lookup("SHOP_API_TOKEN").filter(|t| !t.is_empty()) {
            Some(value) => {
                validate_token(&value, "SHOP_API_TOKEN")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        let timeout_secs = match lookup("SHOP_REQUEST_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("SHOP_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Create a config for `base_url` with no token and the default timeout.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Full URL of an endpoint under the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// The bearer token, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_ref().map(|token| token.expose_secret())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("SHOP_API_URL".to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            "SHOP_API_URL".to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

/// Reject tokens that are obviously copied from a template.
fn validate_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = token.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}
