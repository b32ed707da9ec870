//! Client configuration
//!
//! Every key is optional; a missing key takes its default. Hosts usually embed
//! this block in their own YAML configuration:
//!
//! ```yaml
//! socket_prefix: mangohud
//! registry_path: /proc/net/unix
//! protocol: current
//! discovery_interval_secs: 5
//! min_update_interval_ms: 10
//! history_len: 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::discovery::{DEFAULT_REGISTRY_PATH, DEFAULT_SOCKET_PREFIX};
use crate::history::DEFAULT_HISTORY_LEN;
use crate::types::ProtocolVersion;
use crate::{Result, TelemetryError};

const DEFAULT_DISCOVERY_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for a [`crate::TelemetryClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Socket name prefix; sockets are named `<prefix>-<pid>`
    pub socket_prefix: String,
    /// Local socket registry to scan
    pub registry_path: PathBuf,
    /// Frame layout spoken by the producer
    pub protocol: ProtocolVersion,
    /// Minimum spacing between discovery attempts while disconnected
    pub discovery_interval_secs: f64,
    /// Ticks closer together than this reuse the previous report
    pub min_update_interval_ms: u64,
    /// Points kept per graph history
    pub history_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_prefix: DEFAULT_SOCKET_PREFIX.to_string(),
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            protocol: ProtocolVersion::default(),
            discovery_interval_secs: DEFAULT_DISCOVERY_INTERVAL.as_secs_f64(),
            min_update_interval_ms: 10,
            history_len: DEFAULT_HISTORY_LEN,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.socket_prefix.trim().is_empty() {
            return Err(TelemetryError::config_error("socket_prefix must not be empty"));
        }
        if self.socket_prefix.contains('/') {
            return Err(TelemetryError::config_error("socket_prefix must not contain '/'"));
        }
        if !self.discovery_interval_secs.is_finite() || self.discovery_interval_secs <= 0.0 {
            return Err(TelemetryError::config_error(format!(
                "discovery_interval_secs must be positive, got {}",
                self.discovery_interval_secs
            )));
        }
        if let Err(e) = Duration::try_from_secs_f64(self.discovery_interval_secs) {
            return Err(TelemetryError::Config {
                reason: format!(
                    "discovery_interval_secs {} is out of range",
                    self.discovery_interval_secs
                ),
                source: Some(Box::new(e)),
            });
        }
        if self.history_len == 0 {
            return Err(TelemetryError::config_error("history_len must be at least 1"));
        }
        Ok(())
    }

    /// Discovery spacing; an out-of-range value falls back to the default
    pub fn discovery_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.discovery_interval_secs)
            .unwrap_or(DEFAULT_DISCOVERY_INTERVAL)
    }

    pub fn min_update_interval(&self) -> Duration {
        Duration::from_millis(self.min_update_interval_ms)
    }
}
