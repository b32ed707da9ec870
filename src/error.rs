//! Error types for frame-timing telemetry.
//!
//! Almost nothing in this crate reaches the caller as an error: the
//! [`crate::TelemetryClient`] absorbs discovery, connection and decoding
//! failures and reports them only through its snapshot. The types here exist
//! for the layers underneath (codec, reader, discovery, configuration) and for
//! hosts that drive those layers directly.
//!
//! ## Error Categories
//!
//! - **Discovery Errors**: The local socket registry could not be read
//! - **Connection Errors**: A discovered socket refused or vanished
//! - **Decode Errors**: A frame failed length or field validation
//! - **Disconnection**: The producer closed its end of the socket
//! - **Configuration Errors**: Invalid or unreadable client configuration
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use framewatch::TelemetryError;
//!
//! let error = TelemetryError::connection_failed("connection refused");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::DecodeError;
use crate::reader::DrainError;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Failed to read socket registry {registry}")]
    Discovery {
        registry: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to connect to telemetry socket: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Malformed packet: {0}")]
    Malformed(#[from] DecodeError),

    #[error("Telemetry peer disconnected: {reason}")]
    PeerDisconnected { reason: String },

    #[error("Invalid configuration: {reason}")]
    Config {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Discovery { .. } => true,
            TelemetryError::Connection { .. } => true,
            TelemetryError::Malformed(_) => true,
            TelemetryError::PeerDisconnected { .. } => true,
            TelemetryError::Config { .. } => false,
            TelemetryError::File { .. } => false,
            TelemetryError::UnsupportedPlatform { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::Discovery { .. } => vec![
                "Check that /proc is mounted and readable",
                "Point registry_path at the local socket registry",
            ],
            TelemetryError::Connection { .. } => vec![
                "Ensure the game was launched with MangoHud",
                "Enable fps_socket=1 in the MangoHud configuration",
                "Check socket permissions for the current user",
            ],
            TelemetryError::Malformed(_) => vec![
                "Verify the configured protocol version matches the producer",
                "Update the producer or switch protocol to legacy88",
            ],
            TelemetryError::PeerDisconnected { .. } => vec![
                "Wait for the game to restart; discovery resumes automatically",
                "Check whether the game process crashed",
            ],
            TelemetryError::Config { .. } => vec![
                "Check configuration keys and value ranges",
                "Remove the key to fall back to its default",
            ],
            TelemetryError::File { .. } => vec![
                "Check the configuration file exists and is readable",
                "Check file permissions",
            ],
            TelemetryError::UnsupportedPlatform { .. } => vec![
                "Run on a Unix host with local socket support",
                "Use the codec and statistics modules directly on other platforms",
            ],
        }
    }

    /// Helper constructor for registry read errors.
    pub fn discovery_failed(registry: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TelemetryError::Discovery { registry: registry.into(), source }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        TelemetryError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(reason: impl Into<String>) -> Self {
        TelemetryError::Config { reason: reason.into(), source: None }
    }

    /// Helper constructor for configuration file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Helper constructor for unsupported platform errors.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        TelemetryError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }
}

impl From<DrainError> for TelemetryError {
    fn from(err: DrainError) -> Self {
        match err {
            DrainError::VersionMismatch { source } => TelemetryError::Malformed(source),
            DrainError::Disconnected { source: Some(io) } => {
                TelemetryError::PeerDisconnected { reason: io.to_string() }
            }
            DrainError::Disconnected { source: None } => {
                TelemetryError::PeerDisconnected { reason: "end of stream".to_string() }
            }
        }
    }
}

impl From<serde_yaml_ng::Error> for TelemetryError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        TelemetryError::Config { reason: "YAML parse failure".to_string(), source: Some(Box::new(err)) }
    }
}
