//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `CARTWHEEL_API_URL` - Storefront REST API base URL (default: `http://127.0.0.1:8000/api/`)
//! - `CARTWHEEL_STATE_DIR` - Directory for persisted session and wishlist
//!   (default: `<data dir>/cartwheel`)
//! - `CARTWHEEL_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `CARTWHEEL_PAGE_SIZE` - Products per listing page (default: 8)
//! - `CARTWHEEL_PRODUCT_CACHE_TTL_SECS` - Product cache lifetime, `0` disables (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Products per listing page unless `CARTWHEEL_PAGE_SIZE` says otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 8;
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;
const MAX_PAGE_SIZE: u32 = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront REST API (always ends with `/`)
    pub api_url: Url,
    /// Directory holding the persisted key/value files
    pub state_dir: PathBuf,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Default products per listing page
    pub page_size: u32,
    /// Product cache lifetime (`None` disables caching)
    pub product_cache_ttl: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Build a configuration for `api_url` with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an absolute URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("CARTWHEEL_API_URL", api_url)?,
            state_dir: default_state_dir(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            product_cache_ttl: Some(Duration::from_secs(DEFAULT_PRODUCT_CACHE_TTL_SECS)),
            sentry_dsn: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(
            "CARTWHEEL_API_URL",
            &lookup("CARTWHEEL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;

        let state_dir = lookup("CARTWHEEL_STATE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(default_state_dir, PathBuf::from);

        let timeout_secs = parse_or_default(
            &lookup,
            "CARTWHEEL_HTTP_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CARTWHEEL_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let page_size = parse_or_default(&lookup, "CARTWHEEL_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::InvalidEnvVar(
                "CARTWHEEL_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        let cache_ttl_secs = parse_or_default(
            &lookup,
            "CARTWHEEL_PRODUCT_CACHE_TTL_SECS",
            DEFAULT_PRODUCT_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            api_url,
            state_dir,
            http_timeout: Duration::from_secs(timeout_secs),
            page_size,
            product_cache_ttl: (cache_ttl_secs > 0).then(|| Duration::from_secs(cache_ttl_secs)),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }

    /// Use `dir` for persisted state.
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// Disable the product cache.
    #[must_use]
    pub const fn without_product_cache(mut self) -> Self {
        self.product_cache_ttl = None;
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, forcing a trailing slash so relative joins keep the path.
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Platform data directory, or the working directory when none exists.
fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cartwheel")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, 8);
        assert_eq!(config.product_cache_ttl, Some(Duration::from_secs(300)));
        assert!(config.state_dir.ends_with("cartwheel"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let config =
            ClientConfig::from_vars(vars(&[("CARTWHEEL_API_URL", "https://shop.test/api")]))
                .unwrap();
        assert_eq!(config.api_url.as_str(), "https://shop.test/api/");
        assert_eq!(
            config.api_url.join("cart/").unwrap().as_str(),
            "https://shop.test/api/cart/"
        );
    }

    #[test]
    fn test_invalid_api_url() {
        let result = ClientConfig::from_vars(vars(&[("CARTWHEEL_API_URL", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));

        let result = ClientConfig::from_vars(vars(&[("CARTWHEEL_API_URL", "ftp://shop.test/")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_cache_ttl_zero_disables() {
        let config =
            ClientConfig::from_vars(vars(&[("CARTWHEEL_PRODUCT_CACHE_TTL_SECS", "0")])).unwrap();
        assert!(config.product_cache_ttl.is_none());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(ClientConfig::from_vars(vars(&[("CARTWHEEL_PAGE_SIZE", "0")])).is_err());
        assert!(ClientConfig::from_vars(vars(&[("CARTWHEEL_PAGE_SIZE", "101")])).is_err());
        let config = ClientConfig::from_vars(vars(&[("CARTWHEEL_PAGE_SIZE", "12")])).unwrap();
        assert_eq!(config.page_size, 12);
    }

    #[test]
    fn test_invalid_timeout() {
        let result = ClientConfig::from_vars(vars(&[("CARTWHEEL_HTTP_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "CARTWHEEL_HTTP_TIMEOUT_SECS"));
        assert!(ClientConfig::from_vars(vars(&[("CARTWHEEL_HTTP_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn test_state_dir_override() {
        let config =
            ClientConfig::from_vars(vars(&[("CARTWHEEL_STATE_DIR", "/tmp/cartwheel-test")]))
                .unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/tmp/cartwheel-test"));
    }
}
