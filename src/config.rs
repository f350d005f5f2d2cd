//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::{CacheError, Result};

/// Name of the cache subdirectory inside the platform cache directory.
pub const CACHE_DIR_NAME: &str = "tiered_cache";

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries held by the memory tier
    pub memory_max_entries: usize,
    /// Maximum number of files held by the disk tier
    pub disk_max_entries: usize,
    /// Directory holding one file per disk-tier entry
    pub cache_dir: PathBuf,
    /// Capacity of each tier worker's request channel
    pub worker_buffer: usize,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMORY_MAX_ENTRIES` - Memory tier capacity (default: 100)
    /// - `DISK_MAX_ENTRIES` - Disk tier capacity (default: 1000)
    /// - `CACHE_DIR` - Disk tier directory (default: platform cache dir + `tiered_cache`)
    /// - `WORKER_BUFFER` - Per-tier request channel capacity (default: 64)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memory_max_entries: parse_var("MEMORY_MAX_ENTRIES")
                .unwrap_or(defaults.memory_max_entries),
            disk_max_entries: parse_var("DISK_MAX_ENTRIES").unwrap_or(defaults.disk_max_entries),
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            worker_buffer: parse_var("WORKER_BUFFER").unwrap_or(defaults.worker_buffer),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Creates a config for the given directory with default capacities.
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    /// Rejects capacities that would leave a tier unable to hold anything.
    pub fn validate(&self) -> Result<()> {
        if self.memory_max_entries == 0 {
            return Err(CacheError::InvalidRequest(
                "memory_max_entries must be at least 1".to_string(),
            ));
        }
        if self.disk_max_entries == 0 {
            return Err(CacheError::InvalidRequest(
                "disk_max_entries must be at least 1".to_string(),
            ));
        }
        if self.worker_buffer == 0 {
            return Err(CacheError::InvalidRequest(
                "worker_buffer must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_max_entries: 100,
            disk_max_entries: 1000,
            cache_dir: default_cache_dir(),
            worker_buffer: 64,
            server_port: 3000,
        }
    }
}

/// Platform cache directory joined with [`CACHE_DIR_NAME`].
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join(CACHE_DIR_NAME)
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.memory_max_entries, 100);
        assert_eq!(config.disk_max_entries, 1000);
        assert_eq!(config.worker_buffer, 64);
        assert_eq!(config.server_port, 3000);
        assert!(config.cache_dir.ends_with(CACHE_DIR_NAME));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("MEMORY_MAX_ENTRIES");
        env::remove_var("DISK_MAX_ENTRIES");
        env::remove_var("CACHE_DIR");
        env::remove_var("WORKER_BUFFER");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.memory_max_entries, 100);
        assert_eq!(config.disk_max_entries, 1000);
        assert_eq!(config.worker_buffer, 64);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_dir, default_cache_dir());
    }

    #[test]
    fn test_with_cache_dir() {
        let config = Config::with_cache_dir("/tmp/somewhere");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/somewhere"));
        assert_eq!(config.memory_max_entries, 100);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.memory_max_entries = 0;
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidRequest(_))
        ));

        config.memory_max_entries = 1;
        config.disk_max_entries = 0;
        assert!(config.validate().is_err());

        config.disk_max_entries = 1;
        config.worker_buffer = 0;
        assert!(config.validate().is_err());
    }
}
