//! Rolling frametime window with percentile "low" queries
//!
//! A "1% low" is the fps equivalent of the mean frametime over the worst
//! (longest) 1% of frames in the window. The window is small and queried at
//! display cadence, so every query sorts a copy of the window instead of
//! maintaining an incremental order statistic.

use std::collections::VecDeque;

/// Maximum observations retained
pub const WINDOW_CAPACITY: usize = 1000;

/// Observations required before a 1% low is reported
pub const ONE_PERCENT_MIN_SAMPLES: usize = 100;

/// Observations required before a 0.1% low is reported
pub const ZERO_ONE_PERCENT_MIN_SAMPLES: usize = 1000;

/// Fixed-capacity FIFO of frametime observations in milliseconds
#[derive(Debug, Clone)]
pub struct StatsWindow {
    frametimes: VecDeque<f64>,
}

impl Default for StatsWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsWindow {
    pub fn new() -> Self {
        Self { frametimes: VecDeque::with_capacity(WINDOW_CAPACITY) }
    }

    /// Record one frametime, evicting the oldest when full
    pub fn push(&mut self, frametime_ms: f64) {
        if self.frametimes.len() == WINDOW_CAPACITY {
            self.frametimes.pop_front();
        }
        self.frametimes.push_back(frametime_ms);
    }

    pub fn len(&self) -> usize {
        self.frametimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frametimes.is_empty()
    }

    pub fn clear(&mut self) {
        self.frametimes.clear();
    }

    /// Observations from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.frametimes.iter().copied()
    }

    /// 1% low fps, or `None` below [`ONE_PERCENT_MIN_SAMPLES`]
    pub fn one_percent_low(&self) -> Option<f64> {
        self.low(100, ONE_PERCENT_MIN_SAMPLES)
    }

    /// 0.1% low fps, or `None` below [`ZERO_ONE_PERCENT_MIN_SAMPLES`]
    pub fn zero_one_percent_low(&self) -> Option<f64> {
        self.low(1000, ZERO_ONE_PERCENT_MIN_SAMPLES)
    }

    /// Mean fps over the whole window
    pub fn average_fps(&self) -> Option<f64> {
        if self.frametimes.is_empty() {
            return None;
        }
        let mean = self.frametimes.iter().sum::<f64>() / self.frametimes.len() as f64;
        (mean > 0.0).then(|| 1000.0 / mean)
    }

    fn low(&self, divisor: usize, min_samples: usize) -> Option<f64> {
        let count = self.frametimes.len();
        if count < min_samples {
            return None;
        }

        let mut sorted: Vec<f64> = self.frametimes.iter().copied().collect();
        sorted.sort_unstable_by(|a, b| b.total_cmp(a));

        let worst = (count / divisor).max(1);
        let mean = sorted[..worst].iter().sum::<f64>() / worst as f64;
        if mean <= 0.0 {
            return None;
        }

        // Round up to whole fps
        Some((1000.0 / mean).ceil())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn window_of(values: impl IntoIterator<Item = f64>) -> StatsWindow {
        let mut window = StatsWindow::new();
        for v in values {
            window.push(v);
        }
        window
    }

    #[test]
    fn one_percent_low_needs_100_samples() {
        let window = window_of(std::iter::repeat_n(10.0, 99));
        assert_eq!(window.one_percent_low(), None);

        let window = window_of(std::iter::repeat_n(10.0, 100));
        assert_eq!(window.one_percent_low(), Some(100.0));
    }

    #[test]
    fn worst_frame_dominates_one_percent() {
        let window = window_of(std::iter::repeat_n(10.0, 99).chain([100.0]));
        assert_eq!(window.one_percent_low(), Some(10.0));
    }

    #[test]
    fn zero_one_percent_low_needs_full_window() {
        let window = window_of(std::iter::repeat_n(10.0, 999));
        assert_eq!(window.zero_one_percent_low(), None);
        assert!(window.one_percent_low().is_some());

        let window = window_of(std::iter::repeat_n(10.0, 1000));
        assert_eq!(window.zero_one_percent_low(), Some(100.0));
    }

    #[test]
    fn one_percent_averages_worst_slice() {
        // 200 samples -> worst 2 frames: 40 and 60 ms, mean 50 ms -> 20 fps
        let window = window_of(std::iter::repeat_n(5.0, 198).chain([40.0, 60.0]));
        assert_eq!(window.one_percent_low(), Some(20.0));
    }

    #[test]
    fn low_rounds_up() {
        // 1000 / 7.0 = 142.857...
        let window = window_of(std::iter::repeat_n(7.0, 100));
        assert_eq!(window.one_percent_low(), Some(143.0));
    }

    #[test]
    fn push_past_capacity_evicts_oldest() {
        let mut window = window_of((0..1000).map(f64::from));
        assert_eq!(window.len(), 1000);
        window.push(5000.0);
        assert_eq!(window.len(), 1000);
        assert_eq!(window.iter().next(), Some(1.0));
        assert_eq!(window.iter().last(), Some(5000.0));
    }

    #[test]
    fn average_fps() {
        assert_eq!(StatsWindow::new().average_fps(), None);
        let window = window_of([10.0, 30.0]);
        assert_eq!(window.average_fps(), Some(50.0));
    }

    #[test]
    fn clear_resets_queries() {
        let mut window = window_of(std::iter::repeat_n(10.0, 150));
        assert!(window.one_percent_low().is_some());
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.one_percent_low(), None);
    }

    proptest! {
        #[test]
        fn length_never_exceeds_capacity(values in prop::collection::vec(0.1f64..500.0, 0..2500)) {
            let window = window_of(values.iter().copied());
            prop_assert_eq!(window.len(), values.len().min(WINDOW_CAPACITY));
        }

        #[test]
        fn lows_never_exceed_best_frame_fps(values in prop::collection::vec(0.1f64..500.0, 100..1200)) {
            let window = window_of(values.iter().copied());
            let best = window.iter().fold(f64::INFINITY, f64::min);
            let low = window.one_percent_low().unwrap();
            prop_assert!(low <= (1000.0 / best).ceil());
        }
    }
}
