//! Configuration management for the redlock CLI
//!
//! Sources, lowest precedence first:
//! - `conf/redlock.yml` (optional, path overridable with `--config`)
//! - `REDLOCK_*` environment variables, `__` separating nested keys
//!   (e.g. `REDLOCK_LOCK__RESOURCE=orders`)
//! - command line arguments

use std::time::Duration;

use clap::Parser;
use config::{Config, Environment};
use redlock_common::{RedlockError, Result};
use redlock_core::LockConfig;

use crate::startup::LoggingConfig;

pub const DEFAULT_CONFIG_FILE: &str = "conf/redlock";
pub const DEFAULT_RESOURCE: &str = "key";
/// 30 minutes 10 seconds
pub const DEFAULT_TTL_MS: u64 = 1_810_000;
pub const DEFAULT_ENDPOINTS: &[&str] = &["127.0.0.1:6379", "192.168.100.142:6379"];

/// Command line arguments
#[derive(Debug, Default, Parser)]
#[command(name = "redlock", about = "Acquire and release a quorum lock")]
pub struct Cli {
    /// Configuration file without extension
    #[arg(short = 'c', long = "config", env = "REDLOCK_CONFIG")]
    pub config_file: Option<String>,
    /// Resource to lock
    #[arg(short = 'r', long = "resource")]
    pub resource: Option<String>,
    /// Lock ttl in milliseconds
    #[arg(short = 't', long = "ttl-ms")]
    pub ttl_ms: Option<u64>,
    /// How long to hold a granted lock before releasing it
    #[arg(long = "hold-ms")]
    pub hold_ms: Option<u64>,
    /// Acquisition attempts
    #[arg(long = "retry-count")]
    pub retry_count: Option<u32>,
    /// Comma separated endpoint identifiers
    #[arg(short = 'e', long = "endpoints", value_delimiter = ',')]
    pub endpoints: Vec<String>,
    /// Comma separated endpoint identifiers to start offline
    #[arg(long = "offline", value_delimiter = ',')]
    pub offline: Vec<String>,
}

/// Application configuration loaded from config files, environment and arguments
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(args: Cli) -> Result<Self> {
        let config_file = args
            .config_file
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut config_builder = Config::builder()
            .add_source(config::File::with_name(&config_file).required(false))
            .add_source(
                Environment::with_prefix("REDLOCK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("endpoints")
                    .with_list_parse_key("offline"),
            );

        if let Some(v) = args.resource {
            config_builder = config_builder
                .set_override("lock.resource", v)
                .map_err(config_error)?;
        }
        if let Some(v) = args.ttl_ms {
            config_builder = config_builder
                .set_override("lock.ttl_ms", v)
                .map_err(config_error)?;
        }
        if let Some(v) = args.hold_ms {
            config_builder = config_builder
                .set_override("lock.hold_ms", v)
                .map_err(config_error)?;
        }
        if let Some(v) = args.retry_count {
            config_builder = config_builder
                .set_override("manager.retry_count", v)
                .map_err(config_error)?;
        }
        if !args.endpoints.is_empty() {
            config_builder = config_builder
                .set_override("endpoints", args.endpoints)
                .map_err(config_error)?;
        }
        if !args.offline.is_empty() {
            config_builder = config_builder
                .set_override("offline", args.offline)
                .map_err(config_error)?;
        }

        let app_config = config_builder.build().map_err(config_error)?;

        Ok(Configuration { config: app_config })
    }

    // ========================================================================
    // Lock Configuration
    // ========================================================================

    pub fn resource(&self) -> String {
        self.config
            .get_string("lock.resource")
            .unwrap_or(DEFAULT_RESOURCE.to_string())
    }

    pub fn ttl(&self) -> Duration {
        let ttl_ms = self
            .config
            .get::<u64>("lock.ttl_ms")
            .unwrap_or(DEFAULT_TTL_MS);
        Duration::from_millis(ttl_ms)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.config.get::<u64>("lock.hold_ms").unwrap_or(0))
    }

    /// Manager settings from the `manager` table; missing keys take defaults
    pub fn lock_config(&self) -> Result<LockConfig> {
        let lock_config = match self.config.get::<LockConfig>("manager") {
            Ok(lock_config) => lock_config,
            Err(config::ConfigError::NotFound(_)) => LockConfig::default(),
            Err(e) => return Err(config_error(e)),
        };
        lock_config.validate()?;
        Ok(lock_config)
    }

    // ========================================================================
    // Endpoint Configuration
    // ========================================================================

    pub fn endpoints(&self) -> Vec<String> {
        self.config
            .get::<Vec<String>>("endpoints")
            .unwrap_or_else(|_| DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect())
    }

    pub fn offline_endpoints(&self) -> Vec<String> {
        self.config
            .get::<Vec<String>>("offline")
            .unwrap_or_default()
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    /// Logging settings from the `logging` table, or `REDLOCK_LOG_*` when absent
    pub fn logging_config(&self) -> LoggingConfig {
        if self.config.get_table("logging").is_err() {
            return LoggingConfig::from_env();
        }
        LoggingConfig::from_config(
            self.config.get_string("logging.dir").ok(),
            self.config.get_bool("logging.console").unwrap_or(true),
            self.config.get_bool("logging.file").unwrap_or(false),
            self.config
                .get_string("logging.level")
                .unwrap_or("info".to_string()),
            self.config.get_string("logging.rotation").ok(),
        )
    }
}

fn config_error(e: config::ConfigError) -> RedlockError {
    RedlockError::ConfigError(e.to_string())
}
