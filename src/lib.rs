//! Non-blocking client for local game frame-timing sockets.
//!
//! A game running with an fps-broadcasting overlay (MangoHud with
//! `fps_socket=1`) exposes a local socket named `<prefix>-<pid>` and writes a
//! fixed-size binary record for every rendered frame. framewatch finds that
//! socket, drains it without ever blocking, and turns the stream into the
//! numbers a display wants: current fps and frametime, and rolling 1% / 0.1%
//! lows.
//!
//! # Features
//!
//! - **Discovery**: Scans the local socket registry; no pid configuration
//! - **Process churn**: Reconnects automatically as games start, stop or crash
//! - **Drain-to-latest**: Only the freshest sample per tick is used
//! - **Versioned codec**: Current 60-byte and legacy 88-byte layouts
//! - **Percentile lows**: 1% and 0.1% lows over a 1000-frame window
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use framewatch::{ClientConfig, TelemetryClient};
//! use std::time::Duration;
//!
//! fn main() -> framewatch::Result<()> {
//!     let mut client = TelemetryClient::new(ClientConfig::default())?;
//!     loop {
//!         let report = client.tick();
//!         if report.snapshot.connected {
//!             println!("{:.0} fps, 1% low {:?}", report.snapshot.fps, report.snapshot.one_percent_low);
//!         }
//!         std::thread::sleep(Duration::from_secs(1));
//!     }
//! }
//! ```

// Core types and error handling
pub mod codec;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Socket lifecycle
pub mod client;
pub mod config;
pub mod connection;
pub mod discovery;
pub mod reader;

// Derived metrics
pub mod history;
pub mod stats;

// Core exports
pub use codec::{DecodeError, PacketCodec};
pub use error::*;
pub use types::*;

// Main API exports
pub use client::{MetricsSnapshot, TelemetryClient, TickReport};
pub use config::ClientConfig;
pub use connection::{Connector, UnixConnector};
pub use discovery::{Discover, SocketDiscovery};
pub use history::{MetricHistory, MetricKind};
pub use reader::{DrainError, DrainingReader};
pub use stats::StatsWindow;
