//! Bridge configuration
//!
//! Loaded from a TOML file; every key has a default so a partial file (or
//! none at all) is valid.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::codec::PayloadFormat;
use crate::constants::*;
use crate::error::{Error, Result};

/// Name of the configuration file in the per-user config directory
pub const CONFIG_FILE_NAME: &str = "pupil-bridge.toml";

/// Top-level bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub decoder: PayloadFormat,
    pub ingest: IngestConfig,
    pub control: ControlConfig,
    /// Sensor remote control; start/stop skip the handshake when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamConfig>,
    pub logging: LoggingConfig,
}

/// Sensor telemetry subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Publisher to connect to
    pub endpoint: String,
    /// Topic prefixes; empty subscribes to everything, absent uses the
    /// decoder's usual topic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    /// Bounded wait per ingest read (0 = poll)
    pub wait_ms: u64,
    /// Parts expected in every ingest message
    pub max_parts: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_INGEST_ENDPOINT.to_string(),
            topics: None,
            wait_ms: DEFAULT_INGEST_WAIT_MS,
            max_parts: INGEST_MESSAGE_PARTS,
        }
    }
}

/// Controller-facing replier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Local address to bind
    pub endpoint: String,
    /// Bounded wait for a control request per loop iteration
    pub wait_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CONTROL_ENDPOINT.to_string(),
            wait_ms: DEFAULT_CONTROL_WAIT_MS,
        }
    }
}

/// Sensor remote-control requester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub endpoint: String,
    pub start_command: String,
    pub stop_command: String,
    /// Wait for an acknowledgement before giving up on the peer
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_UPSTREAM_ENDPOINT.to_string(),
            start_command: "R".to_string(),
            stop_command: "r".to_string(),
            timeout_ms: DEFAULT_UPSTREAM_TIMEOUT_MS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Period of the statistics log line; 0 disables it
    pub stats_interval_secs: u64,
    /// Log every ingest topic and payload at debug level
    pub dump_frames: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            stats_interval_secs: DEFAULT_STATS_INTERVAL_SECS,
            dump_frames: false,
        }
    }
}

impl IngestConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

impl BridgeConfig {
    /// Subscription prefixes after applying the decoder default
    pub fn topics(&self) -> Vec<String> {
        match &self.ingest.topics {
            Some(topics) => topics.clone(),
            None => vec![self.decoder.default_topic().to_string()],
        }
    }
}

impl ControlConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl LoggingConfig {
    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval_secs > 0).then(|| Duration::from_secs(self.stats_interval_secs))
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config: BridgeConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Per-user configuration file location
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "pupil-bridge", "pupil-bridge")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Explicit path, else the per-user file if it exists, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject values the event loop cannot honour
    pub fn validate(&self) -> Result<()> {
        let max_wait = 1000 / MIN_RECORDING_RATE_HZ;
        if self.control.wait_ms == 0 || self.control.wait_ms >= max_wait {
            return Err(Error::Config(format!(
                "control.wait_ms must be between 1 and {} (got {})",
                max_wait - 1,
                self.control.wait_ms
            )));
        }
        if self.ingest.max_parts == 0 {
            return Err(Error::Config("ingest.max_parts must be at least 1".into()));
        }
        if let Some(upstream) = &self.upstream {
            if upstream.timeout_ms == 0 {
                return Err(Error::Config("upstream.timeout_ms must be positive".into()));
            }
            if upstream.start_command.is_empty() || upstream.stop_command.is_empty() {
                return Err(Error::Config(
                    "upstream start/stop commands must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}
