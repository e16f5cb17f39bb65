//! Configuration management for tais-relay
//!
//! Bootstrap configuration comes from, in priority order:
//! 1. Command-line arguments (each with an environment variable fallback)
//! 2. TOML configuration file (see `tais_common::config` for lookup)
//! 3. Built-in defaults (code constants)
//!
//! Nothing here changes while the service runs.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MODULE_NAME: &str = "tais-relay";

/// Complete bootstrap configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_address: String,

    /// HTTP server port
    pub port: u16,

    /// Publish tracks that carry neither squawk nor Mode-S code
    pub emit_primary_targets: bool,

    /// Upper bound on an ingestion request body
    pub max_batch_bytes: usize,

    pub stream: StreamConfig,

    pub altimeter: AltimeterConfig,

    pub logging: LoggingConfig,

    /// File the values were read from; `None` when running on defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Per-connection publisher settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Interval between store polls
    pub poll_interval_ms: u64,

    /// Pause after a failed poll cycle
    pub fault_backoff_ms: u64,

    /// Lines buffered between the publisher task and the HTTP body
    pub channel_capacity: usize,
}

/// Reference-pressure source and refresh policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AltimeterConfig {
    /// METAR endpoint returning `{"altimeter": {"value": <inHg>}}`
    pub url: String,

    /// Bearer token for the METAR endpoint; empty sends no Authorization header
    pub token: String,

    /// Sleep between periodic refreshes; also the staleness threshold
    pub refresh_interval_secs: u64,

    /// Timeout applied to each fetch
    pub request_timeout_secs: u64,

    /// Fetch attempts made at startup before entering the periodic loop
    pub startup_attempts: u32,

    /// Delay between startup attempts
    pub startup_retry_delay_secs: u64,

    /// Setting used until the first successful fetch
    pub initial_setting_inhg: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            emit_primary_targets: true,
            max_batch_bytes: 8 * 1024 * 1024,
            stream: StreamConfig::default(),
            altimeter: AltimeterConfig::default(),
            logging: LoggingConfig::default(),
            source: None,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            fault_backoff_ms: 1000,
            channel_capacity: 256,
        }
    }
}

impl Default for AltimeterConfig {
    fn default() -> Self {
        Self {
            url: "https://avwx.rest/api/metar/KSTL".to_string(),
            token: String::new(),
            refresh_interval_secs: 300,
            request_timeout_secs: 5,
            startup_attempts: 3,
            startup_retry_delay_secs: 5,
            initial_setting_inhg: 29.92,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl StreamConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn fault_backoff(&self) -> Duration {
        Duration::from_millis(self.fault_backoff_ms)
    }
}

impl AltimeterConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn startup_retry_delay(&self) -> Duration {
        Duration::from_secs(self.startup_retry_delay_secs)
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub emit_primary_targets: Option<bool>,
    pub altimeter_url: Option<String>,
    pub altimeter_token: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from the resolved TOML file and apply CLI overrides
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - An explicitly named config file is missing or unreadable
    /// - The TOML cannot be parsed
    /// - A value fails validation
    pub fn load(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let resolver = tais_common::config::ConfigFileResolver::new(MODULE_NAME);
        let resolved = resolver.resolve(config_path)?;
        let mut config: Config = tais_common::config::load_toml_or_default(resolved.as_deref())?;
        config.source = resolved;

        let config = config.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (no overrides)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = tais_common::config::parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of file/default values
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.bind_address = bind_address;
        }
        if let Some(emit) = overrides.emit_primary_targets {
            self.emit_primary_targets = emit;
        }
        if let Some(url) = overrides.altimeter_url {
            self.altimeter.url = url;
        }
        if let Some(token) = overrides.altimeter_token {
            self.altimeter.token = token;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        self
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.stream.poll_interval_ms == 0 {
            return Err(Error::Config("stream.poll_interval_ms must be > 0".to_string()));
        }
        if self.stream.channel_capacity == 0 {
            return Err(Error::Config("stream.channel_capacity must be > 0".to_string()));
        }
        if self.altimeter.refresh_interval_secs == 0 {
            return Err(Error::Config(
                "altimeter.refresh_interval_secs must be > 0".to_string(),
            ));
        }
        if self.altimeter.startup_attempts == 0 {
            return Err(Error::Config(
                "altimeter.startup_attempts must be > 0".to_string(),
            ));
        }
        if !(self.altimeter.initial_setting_inhg > 0.0) {
            return Err(Error::Config(
                "altimeter.initial_setting_inhg must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
