//! Console monitor for a running game's frame-timing socket.
//!
//! Ticks the client once per second and prints a fixed-width row, the same way
//! a display theme would poll it. Pass a YAML config path as the only argument
//! to override defaults. Set `RUST_LOG=framewatch=debug` to see discovery and
//! connection activity.
//!
//! Requirements: the game runs with MangoHud and `fps_socket=1` is set in
//! `~/.config/MangoHud/MangoHud.conf`.

use anyhow::Context;
use framewatch::{ClientConfig, MetricKind, MetricsSnapshot, TelemetryClient};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_secs(1);
const PLACEHOLDER: &str = "---";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => ClientConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.to_string_lossy()))?,
        None => ClientConfig::default(),
    };

    let mut client = TelemetryClient::new(config).context("creating telemetry client")?;

    println!(
        "{:>12} | {:>3} | {:>3} | {:>4} | {:>3} | {:>3} | {:>3} | {:>3} | {:>3} | {:>3} | {:>3}",
        "Status", "FPS", "1%", "0.1%", "AVG", "GL%", "GT", "GP", "CL%", "CT", "CP"
    );
    println!("{}", "-".repeat(76));

    let mut ticks = 0u64;
    loop {
        let report = client.tick();
        println!("{}", format_row(&report.snapshot));

        ticks += 1;
        if ticks % 60 == 0 {
            let fps: Vec<f64> =
                client.history(MetricKind::Fps).into_iter().filter(|v| !v.is_nan()).collect();
            if let Some(summary) = summarize(&fps) {
                println!("{summary}");
            }
        }

        std::thread::sleep(TICK);
    }
}

fn format_row(snapshot: &MetricsSnapshot) -> String {
    let status = match snapshot.owner_pid {
        Some(pid) if snapshot.connected => format!("PID {pid}"),
        _ => "Scanning...".to_string(),
    };
    let sample = snapshot.sample.filter(|_| snapshot.connected);
    let live = |v: f64| snapshot.connected.then_some(v);

    format!(
        "{:>12} | {} | {} | {:>4} | {} | {} | {} | {} | {} | {} | {}",
        status,
        cell(live(snapshot.fps)),
        cell(snapshot.one_percent_low),
        cell(snapshot.zero_one_percent_low),
        cell(snapshot.average_fps),
        cell(sample.map(|s| f64::from(s.gpu_load))),
        cell(sample.map(|s| f64::from(s.gpu_temp_c))),
        cell(sample.map(|s| f64::from(s.gpu_power_w))),
        cell(sample.map(|s| f64::from(s.cpu_load))),
        cell(sample.map(|s| f64::from(s.cpu_temp_c))),
        cell(sample.map(|s| f64::from(s.cpu_power_w))),
    )
}

/// Fixed three-character cell so shorter values never leave stale digits behind
fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:>3}", v.round() as i64),
        _ => PLACEHOLDER.to_string(),
    }
}

fn summarize(fps: &[f64]) -> Option<String> {
    if fps.is_empty() {
        return None;
    }
    let min = fps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = fps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = fps.iter().sum::<f64>() / fps.len() as f64;
    Some(format!(
        "last {} samples: min {min:.1} / max {max:.1} / avg {avg:.1} fps",
        fps.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_row_uses_placeholders() {
        let row = format_row(&MetricsSnapshot::default());
        assert!(row.contains("Scanning..."));
        assert!(!row.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn cells_are_fixed_width() {
        assert_eq!(cell(Some(7.4)), "  7");
        assert_eq!(cell(Some(143.6)), "144");
        assert_eq!(cell(None), "---");
        assert_eq!(cell(Some(f64::NAN)), "---");
    }

    #[test]
    fn summary_skips_empty_history() {
        assert_eq!(summarize(&[]), None);
        let text = summarize(&[60.0, 120.0]).unwrap();
        assert!(text.contains("min 60.0"));
        assert!(text.contains("avg 90.0"));
    }
}
