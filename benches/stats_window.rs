//! Benchmarks for the rolling frametime window
//!
//! Percentile lows are recomputed on every accepted sample, so a full
//! 1000-frame window has to stay well inside a display tick.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use framewatch::StatsWindow;
use std::hint::black_box;

/// Window of `len` frametimes with a few stutters mixed in
fn filled_window(len: usize) -> StatsWindow {
    let mut window = StatsWindow::new();
    for i in 0..len {
        let frametime = if i % 97 == 0 { 33.3 } else { 6.9 + (i % 7) as f64 * 0.1 };
        window.push(frametime);
    }
    window
}

fn bench_push(c: &mut Criterion) {
    let mut window = filled_window(1000);

    c.bench_function("push_full_window", |b| {
        b.iter(|| window.push(black_box(8.333)));
    });
}

fn bench_lows(c: &mut Criterion) {
    let mut group = c.benchmark_group("percentile_lows");

    for len in [100usize, 500, 1000] {
        let window = filled_window(len);
        group.bench_with_input(BenchmarkId::new("one_percent", len), &window, |b, w| {
            b.iter(|| black_box(w.one_percent_low()));
        });
        group.bench_with_input(BenchmarkId::new("zero_one_percent", len), &window, |b, w| {
            b.iter(|| black_box(w.zero_one_percent_low()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_push, bench_lows);
criterion_main!(benches);
