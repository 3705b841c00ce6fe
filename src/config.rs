//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{StorageLocation, DEFAULT_MAX_AGE};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database file path, or `:memory:` for a non-durable store
    pub db_path: String,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Default max age in milliseconds for assets stored without one
    pub default_max_age_ms: u64,
    /// Base URL assets are fetched from on a cache miss
    pub origin_url: Option<String>,
    /// Origin request timeout in seconds
    pub origin_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ASSET_CACHE_PATH` - Database path (default: asset_cache.db)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 3600)
    /// - `DEFAULT_MAX_AGE` - Default max age in milliseconds (default: 7 days)
    /// - `ORIGIN_URL` - Origin base URL (default: unset, no origin fetching)
    /// - `ORIGIN_TIMEOUT` - Origin request timeout in seconds (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env::var("ASSET_CACHE_PATH").unwrap_or(defaults.db_path),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            default_max_age_ms: parse_var("DEFAULT_MAX_AGE")
                .unwrap_or(defaults.default_max_age_ms),
            origin_url: env::var("ORIGIN_URL").ok().filter(|v| !v.trim().is_empty()),
            origin_timeout: parse_var("ORIGIN_TIMEOUT").unwrap_or(defaults.origin_timeout),
        }
    }

    /// Where the cache database lives.
    pub fn storage_location(&self) -> StorageLocation {
        if self.db_path == ":memory:" {
            StorageLocation::Memory
        } else {
            StorageLocation::File(PathBuf::from(&self.db_path))
        }
    }

    pub fn default_max_age(&self) -> Duration {
        Duration::from_millis(self.default_max_age_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "asset_cache.db".to_string(),
            server_port: 3000,
            cleanup_interval: 3600,
            default_max_age_ms: DEFAULT_MAX_AGE.as_millis() as u64,
            origin_url: None,
            origin_timeout: 10,
        }
    }
}
