//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Store Configuration
//!
//! ### Method 1: Full URL
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! ```
//!
//! ### Method 2: Individual components
//!
//! ```bash
//! export REDIS_HOST="localhost"
//! export REDIS_PORT="6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="0"
//! ```
//!
//! Without either, links and quotas are kept in process memory and are lost
//! on restart.
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `DOMAIN` - Public domain used in short URLs (default: `localhost:3000`)
//! - `API_QUOTA` - Shortening requests per client per window (default: 10)
//! - `RATE_LIMIT_WINDOW_SECONDS` - Quota window length (default: 1800)
//! - `DEFAULT_EXPIRY_HOURS` - Link lifetime when none is requested (default: 24)
//! - `STORE_TIMEOUT_MS` - Per-operation store timeout (default: 2000)
//! - `BEHIND_PROXY` - Trust `X-Forwarded-For` / `X-Real-IP` (default: false)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::Result;
use std::env;
use std::time::Duration;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Public domain prepended to identifiers; also the host that targets
    /// may not point at.
    pub domain: String,
    pub redis_url: Option<String>,
    pub api_quota: u32,
    pub rate_limit_window_seconds: u64,
    pub default_expiry_hours: u64,
    pub store_timeout_ms: u64,
    /// When true, the client address is read from X-Forwarded-For / X-Real-IP.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,
    pub log_level: String,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            domain: "localhost:3000".to_string(),
            redis_url: None,
            api_quota: 10,
            rate_limit_window_seconds: 30 * 60,
            default_expiry_hours: 24,
            store_timeout_ms: 2000,
            behind_proxy: false,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Unset or unparsable numeric values fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let listen_addr = env::var("LISTEN").unwrap_or(defaults.listen_addr);
        let domain = env::var("DOMAIN").unwrap_or(defaults.domain);
        let log_level = env::var("RUST_LOG").unwrap_or(defaults.log_level);
        let log_format = env::var("LOG_FORMAT").unwrap_or(defaults.log_format);

        let redis_url = Self::load_redis_url();

        let api_quota = env::var("API_QUOTA")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.api_quota);

        let rate_limit_window_seconds = env::var("RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.rate_limit_window_seconds);

        let default_expiry_hours = env::var("DEFAULT_EXPIRY_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.default_expiry_hours);

        let store_timeout_ms = env::var("STORE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.store_timeout_ms);

        let behind_proxy = env::var("BEHIND_PROXY")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(Self {
            listen_addr,
            domain,
            redis_url,
            api_quota,
            rate_limit_window_seconds,
            default_expiry_hours,
            store_timeout_ms,
            behind_proxy,
            log_level,
            log_format,
        })
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// Returns `None` if Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        let url = match env::var("REDIS_PASSWORD") {
            Ok(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        Some(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `api_quota`, the window, the default expiry, or the store timeout is zero
    /// - `domain` is empty
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is not `host:port`
    /// - the Redis URL has an unknown scheme
    pub fn validate(&self) -> Result<()> {
        if self.api_quota == 0 {
            anyhow::bail!("API_QUOTA must be at least 1");
        }

        if self.rate_limit_window_seconds == 0 {
            anyhow::bail!("RATE_LIMIT_WINDOW_SECONDS must be greater than 0");
        }

        if self.default_expiry_hours == 0 {
            anyhow::bail!("DEFAULT_EXPIRY_HOURS must be greater than 0");
        }

        if self.store_timeout_ms == 0 {
            anyhow::bail!("STORE_TIMEOUT_MS must be greater than 0");
        }

        if self.domain.trim().is_empty() {
            anyhow::bail!("DOMAIN must not be empty");
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                mask_connection_string(redis_url)
            );
        }

        Ok(())
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_seconds)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Domain: {}", self.domain);

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!("  Store: Redis at {}", mask_connection_string(redis_url));
        } else {
            tracing::info!("  Store: in-memory");
        }

        tracing::info!(
            "  Quota: {} requests per {}s",
            self.api_quota,
            self.rate_limit_window_seconds
        );
        tracing::info!("  Default expiry: {}h", self.default_expiry_hours);
        tracing::info!("  Behind proxy: {}", self.behind_proxy);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Masks sensitive information in connection strings for logging.
///
/// `redis://:password@host:port/db` becomes `redis://:***@host:port/db`.
pub fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "LISTEN",
        "DOMAIN",
        "API_QUOTA",
        "RATE_LIMIT_WINDOW_SECONDS",
        "DEFAULT_EXPIRY_HOURS",
        "STORE_TIMEOUT_MS",
        "BEHIND_PROXY",
        "LOG_FORMAT",
        "REDIS_URL",
        "REDIS_HOST",
        "REDIS_PORT",
        "REDIS_PASSWORD",
        "REDIS_DB",
    ];

    fn clear_env() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            for var in VARS {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_mask_connection_string() {
        assert_eq!(
            mask_connection_string("redis://:password@localhost:6379/0"),
            "redis://:***@localhost:6379/0"
        );

        assert_eq!(
            mask_connection_string("redis://localhost:6379/0"),
            "redis://localhost:6379/0"
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.api_quota = 0;
        assert!(config.validate().is_err());
        config.api_quota = 10;

        config.rate_limit_window_seconds = 0;
        assert!(config.validate().is_err());
        config.rate_limit_window_seconds = 1800;

        config.default_expiry_hours = 0;
        assert!(config.validate().is_err());
        config.default_expiry_hours = 24;

        config.domain = "  ".to_string();
        assert!(config.validate().is_err());
        config.domain = "short.io".to_string();

        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());
        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        config.listen_addr = "3000".to_string();
        assert!(config.validate().is_err());
        config.listen_addr = "0.0.0.0:3000".to_string();

        config.redis_url = Some("http://localhost:6379".to_string());
        assert!(config.validate().is_err());
        config.redis_url = Some("rediss://localhost:6379".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_defaults_when_env_empty() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.domain, "localhost:3000");
        assert_eq!(config.api_quota, 10);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(1800));
        assert_eq!(config.default_expiry_hours, 24);
        assert_eq!(config.store_timeout(), Duration::from_millis(2000));
        assert!(!config.behind_proxy);
        assert!(config.redis_url.is_none());
    }

    #[test]
    #[serial]
    fn test_overrides_from_env() {
        clear_env();
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("DOMAIN", "short.io");
            env::set_var("API_QUOTA", "25");
            env::set_var("RATE_LIMIT_WINDOW_SECONDS", "60");
            env::set_var("DEFAULT_EXPIRY_HOURS", "48");
            env::set_var("BEHIND_PROXY", "TRUE");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.domain, "short.io");
        assert_eq!(config.api_quota, 25);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
        assert_eq!(config.default_expiry_hours, 48);
        assert!(config.behind_proxy);

        // Unparsable numbers fall back to defaults
        unsafe {
            env::set_var("API_QUOTA", "many");
        }
        assert_eq!(Config::from_env().unwrap().api_quota, 10);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_redis_url_from_components() {
        clear_env();
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("REDIS_HOST", "redis-host");
            env::set_var("REDIS_PORT", "6380");
            env::set_var("REDIS_DB", "1");
        }

        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://redis-host:6380/1");

        unsafe {
            env::set_var("REDIS_PASSWORD", "secret");
        }
        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://:secret@redis-host:6380/1");

        // Empty password means no authentication
        unsafe {
            env::set_var("REDIS_PASSWORD", "");
        }
        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://redis-host:6380/1");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_redis_url_priority() {
        clear_env();
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("REDIS_URL", "redis://from-url:6379/0");
            env::set_var("REDIS_HOST", "from-components");
        }

        let url = Config::load_redis_url().unwrap();

        assert!(url.contains("from-url"));
        assert!(!url.contains("from-components"));

        clear_env();
    }
}
