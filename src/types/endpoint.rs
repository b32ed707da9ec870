//! Discovered endpoints and client connection state

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A connectable telemetry socket found during discovery.
///
/// `socket_path` is kept exactly as the registry reports it: abstract
/// namespace sockets start with `@`, filesystem sockets are absolute paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Endpoint {
    pub socket_path: String,
    pub owner_pid: u32,
}

impl Endpoint {
    pub fn new(socket_path: impl Into<String>, owner_pid: u32) -> Self {
        Self { socket_path: socket_path.into(), owner_pid }
    }

    /// Whether the socket lives in the Linux abstract namespace
    pub fn is_abstract(&self) -> bool {
        self.socket_path.starts_with('@')
    }

    /// Abstract socket name without the leading `@`
    pub fn abstract_name(&self) -> Option<&str> {
        self.socket_path.strip_prefix('@')
    }

    /// Filesystem path of a non-abstract socket
    pub fn filesystem_path(&self) -> Option<&Path> {
        (!self.is_abstract()).then(|| Path::new(&self.socket_path))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (pid {})", self.socket_path, self.owner_pid)
    }
}

/// Lifecycle state of a [`crate::TelemetryClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ConnectionState {
    /// No socket held; discovery runs on schedule
    Disconnected,
    /// A registry scan and connection attempt is in progress
    Discovering,
    /// Draining the socket owned by `owner_pid`
    Connected { owner_pid: u32 },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    pub fn owner_pid(&self) -> Option<u32> {
        match self {
            ConnectionState::Connected { owner_pid } => Some(*owner_pid),
            _ => None,
        }
    }
}
