//! Values handed to the display pipeline each tick

use serde::{Deserialize, Serialize};

use crate::types::Sample;

/// Read-only view of the client's current metrics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct MetricsSnapshot {
    pub connected: bool,
    /// Process that owns the connected socket
    pub owner_pid: Option<u32>,
    /// Last reported producer fps; kept when a tick brings no new data
    pub fps: f64,
    pub frametime_ms: f64,
    /// Absent until the window holds 100 observations
    pub one_percent_low: Option<f64>,
    /// Absent until the window holds 1000 observations
    pub zero_one_percent_low: Option<f64>,
    /// Mean fps over the rolling window
    pub average_fps: Option<f64>,
    /// Full latest sample including auxiliary CPU/GPU metrics
    pub sample: Option<Sample>,
}

impl MetricsSnapshot {
    /// Snapshot for a freshly connected session that has not drained yet
    pub(crate) fn connected(owner_pid: u32) -> Self {
        Self { connected: true, owner_pid: Some(owner_pid), ..Default::default() }
    }
}

/// Result of one [`crate::TelemetryClient::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct TickReport {
    pub snapshot: MetricsSnapshot,
    /// Whether this tick decoded at least one new sample
    pub has_recent_data: bool,
}
