//! Decoded frame-timing sample

use serde::{Deserialize, Serialize};

/// One decoded packet from the frame-timing socket.
///
/// Samples are plain values: once decoded they are never mutated, only
/// replaced by a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Sample {
    /// Producer-side frames per second
    pub fps: f64,
    /// Duration of the last rendered frame in milliseconds
    pub frametime_ms: f32,
    pub cpu_load: f32,
    pub cpu_power_w: f32,
    pub cpu_mhz: i32,
    pub gpu_load: i32,
    pub cpu_temp_c: i32,
    pub gpu_temp_c: i32,
    pub gpu_core_clock_mhz: i32,
    pub gpu_mem_clock_mhz: i32,
    pub gpu_power_w: i32,
    /// 1% low as computed by the producer over its own window
    pub fps_1_percent_low: f32,
    /// Producer clock in nanoseconds, monotonically increasing within a session
    pub elapsed_ns: u64,
    /// Fields only present in the legacy 88-byte layout
    pub extras: Option<LegacyExtras>,
}

/// Additional metrics carried by [`crate::ProtocolVersion::Legacy88`] frames
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LegacyExtras {
    pub gpu_vram_used_gb: f32,
    pub ram_used_gb: f32,
    pub swap_used_gb: f32,
    pub process_rss_gb: f32,
    pub gpu_junction_temp_c: i32,
    pub fps_0_1_percent_low: f32,
    pub fps_97th_percentile: f32,
}

impl Sample {
    /// Frames per second implied by the frametime alone
    pub fn frametime_fps(&self) -> f64 {
        if self.frametime_ms > 0.0 { 1000.0 / f64::from(self.frametime_ms) } else { 0.0 }
    }

    /// GPU junction temperature, only known for legacy frames
    pub fn gpu_junction_temp_c(&self) -> Option<i32> {
        self.extras.map(|e| e.gpu_junction_temp_c)
    }

    /// VRAM in use, only known for legacy frames
    pub fn gpu_vram_used_gb(&self) -> Option<f32> {
        self.extras.map(|e| e.gpu_vram_used_gb)
    }
}
