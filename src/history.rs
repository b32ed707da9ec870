//! Fixed-length metric histories for line graphs
//!
//! Each history always holds exactly `len` points. Unfilled slots and ticks
//! where a metric is unknown are NaN, which graph renderers treat as gaps.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::Sample;

/// Default number of points kept per metric
pub const DEFAULT_HISTORY_LEN: usize = 60;

/// Metrics that keep a graph history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Fps,
    GpuLoad,
    GpuTemp,
    GpuJunctionTemp,
    GpuPower,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Fps,
        MetricKind::GpuLoad,
        MetricKind::GpuTemp,
        MetricKind::GpuJunctionTemp,
        MetricKind::GpuPower,
    ];

    /// Value of this metric in `sample`, NaN when the layout lacks it
    pub fn value_of(self, sample: &Sample) -> f64 {
        match self {
            MetricKind::Fps => sample.fps,
            MetricKind::GpuLoad => f64::from(sample.gpu_load),
            MetricKind::GpuTemp => f64::from(sample.gpu_temp_c),
            MetricKind::GpuJunctionTemp => {
                sample.gpu_junction_temp_c().map_or(f64::NAN, f64::from)
            }
            MetricKind::GpuPower => f64::from(sample.gpu_power_w),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Rolling NaN-padded histories for every [`MetricKind`]
#[derive(Debug, Clone)]
pub struct MetricHistory {
    len: usize,
    series: [VecDeque<f64>; 5],
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl MetricHistory {
    pub fn new(len: usize) -> Self {
        let blank = || std::iter::repeat_n(f64::NAN, len).collect::<VecDeque<_>>();
        Self { len, series: std::array::from_fn(|_| blank()) }
    }

    /// Append one point per metric taken from `sample`
    pub fn record(&mut self, sample: &Sample) {
        for kind in MetricKind::ALL {
            self.push(kind, kind.value_of(sample));
        }
    }

    fn push(&mut self, kind: MetricKind, value: f64) {
        let series = &mut self.series[kind.index()];
        if self.len == 0 {
            return;
        }
        if series.len() == self.len {
            series.pop_front();
        }
        series.push_back(value);
    }

    /// Points for `kind`, oldest first
    pub fn values(&self, kind: MetricKind) -> Vec<f64> {
        self.series[kind.index()].iter().copied().collect()
    }

    /// Most recent point for `kind`
    pub fn last(&self, kind: MetricKind) -> Option<f64> {
        self.series[kind.index()].back().copied().filter(|v| !v.is_nan())
    }

    /// Refill every series with NaN
    pub fn reset(&mut self) {
        for series in &mut self.series {
            series.clear();
            series.extend(std::iter::repeat_n(f64::NAN, self.len));
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
