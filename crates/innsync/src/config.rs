//! Application configuration.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. Environment variables (prefixed with `INNSYNC_`, e.g.,
//!    `INNSYNC_DATABASE__URL`, `INNSYNC_UPSTREAM__API_KEY`)
//! 2. Config file (`./innsync.toml`)
//! 3. Built-in defaults
//!
//! The database URL defaults to a SQLite file under the platform state
//! directory if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [upstream]
//! base_url = "https://content-api.example.com"
//! version = "v3"
//! api_key = "..."          # or INNSYNC_UPSTREAM__API_KEY
//!
//! [database]
//! url = "postgres:///innsync"
//!
//! [sync]
//! interval = "12h"
//! batch_size = 10
//! max_concurrent = 5
//! retry_attempts = 3
//! retry_delay = "5s"
//! rate_limit_per_sec = 10
//! enable_auto = true
//! ```

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::sync::{parse_interval, SyncConfig, SyncError};
use crate::upstream::UpstreamConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upstream content API settings.
    pub upstream: UpstreamSettings,
    /// Database settings.
    pub database: DatabaseSettings,
    /// Sync pipeline settings.
    pub sync: SyncSettings,
}

/// Upstream content API settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// API version path segment.
    pub version: String,
    /// API key; empty disables the auth header.
    pub api_key: String,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        let defaults = UpstreamConfig::default();
        Self {
            base_url: defaults.base_url,
            version: defaults.version,
            api_key: defaults.api_key,
        }
    }
}

/// Database settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection URL. Supports sqlite:// and postgres:// schemes.
    /// Defaults to a SQLite file under the platform state directory.
    pub url: Option<String>,
}

/// Sync pipeline settings as they appear in config sources; durations are
/// literals like `12h` and are validated by [`AppConfig::sync_config`].
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub interval: String,
    pub batch_size: usize,
    pub max_concurrent: usize,
    pub retry_attempts: usize,
    pub retry_delay: String,
    pub rate_limit_per_sec: u32,
    pub enable_auto: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        let defaults = SyncConfig::default();
        Self {
            interval: crate::sync::format_interval(defaults.interval),
            batch_size: defaults.batch_size,
            max_concurrent: defaults.max_concurrent,
            retry_attempts: defaults.retry_attempts,
            retry_delay: crate::sync::format_interval(defaults.retry_delay),
            rate_limit_per_sec: defaults.rate_limit_per_sec,
            enable_auto: defaults.enable_auto,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file (if present) and the
    /// environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = ConfigBuilder::builder()
            .add_source(File::new("innsync.toml", FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("INNSYNC")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// The upstream client configuration.
    pub fn upstream_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            base_url: self.upstream.base_url.clone(),
            version: self.upstream.version.clone(),
            api_key: self.upstream.api_key.clone(),
        }
    }

    /// The validated sync configuration.
    pub fn sync_config(&self) -> Result<SyncConfig, SyncError> {
        Ok(SyncConfig {
            interval: parse_interval(&self.sync.interval)?,
            batch_size: self.sync.batch_size,
            max_concurrent: self.sync.max_concurrent,
            retry_attempts: self.sync.retry_attempts,
            retry_delay: parse_interval(&self.sync.retry_delay)?,
            rate_limit_per_sec: self.sync.rate_limit_per_sec,
            enable_auto: self.sync.enable_auto,
        })
    }

    /// The database URL, falling back to a SQLite file under the platform
    /// state directory.
    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database.url {
            return url.clone();
        }
        default_database_url()
    }
}

fn default_database_url() -> String {
    let state_dir = ProjectDirs::from("", "", "innsync")
        .map(|dirs| {
            dirs.state_dir()
                .unwrap_or_else(|| dirs.data_dir())
                .to_path_buf()
        })
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    format!("sqlite://{}/innsync.db?mode=rwc", state_dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_into_sync_config() {
        let config = AppConfig::default();
        let sync = config.sync_config().expect("defaults should validate");
        assert_eq!(sync, SyncConfig::default());
    }

    #[test]
    fn bad_interval_literal_is_rejected() {
        let config = AppConfig {
            sync: SyncSettings {
                interval: "whenever".to_string(),
                ..SyncSettings::default()
            },
            ..AppConfig::default()
        };
        assert!(config.sync_config().is_err());
    }

    #[test]
    fn database_url_falls_back_to_state_dir_sqlite() {
        let config = AppConfig::default();
        let url = config.database_url();
        assert!(url.starts_with("sqlite://"));
        assert!(url.contains("innsync.db"));
    }

    #[test]
    fn explicit_database_url_wins() {
        let config = AppConfig {
            database: DatabaseSettings {
                url: Some("postgres:///innsync_dev".to_string()),
            },
            ..AppConfig::default()
        };
        assert_eq!(config.database_url(), "postgres:///innsync_dev");
    }
}
