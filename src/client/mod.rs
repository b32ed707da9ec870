//! Long-lived telemetry client
//!
//! [`TelemetryClient`] ties discovery, connection, draining and statistics into
//! one handle that a host constructs once and ticks from its display loop.
//!
//! ```text
//!            scan finds nothing / connect fails
//!            ┌───────────────┐
//!            ▼               │
//!   Disconnected ──tick──▶ Discovering ──connected──▶ Connected
//!            ▲                                          │
//!            └──────────── peer closed / error ─────────┘
//! ```
//!
//! Every tick is non-blocking. Failures never escape: the caller only sees
//! `connected` flip and percentile fields come and go. A producer speaking a
//! different protocol version than configured is dropped like a disconnected
//! one and retried on the discovery schedule.

use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::codec::PacketCodec;
use crate::config::ClientConfig;
use crate::connection::{Connector, UnixConnector};
use crate::discovery::{Discover, SocketDiscovery};
use crate::history::{MetricHistory, MetricKind};
use crate::reader::DrainingReader;
use crate::stats::StatsWindow;
use crate::types::{ConnectionState, Endpoint, Sample};
use crate::{Result, TelemetryError};

mod snapshot;

pub use snapshot::{MetricsSnapshot, TickReport};

/// State owned by one connected producer; dropping it closes the socket
struct Session<S> {
    endpoint: Endpoint,
    reader: DrainingReader<S>,
    window: StatsWindow,
    last_elapsed_ns: Option<u64>,
}

impl<S> Session<S> {
    /// Frametime observation standing in for everything since the previous
    /// accepted sample.
    ///
    /// The producer clock delta is spread evenly over the number of frames it
    /// spans. Without a usable delta (first sample, clock reset) the sample's
    /// own frametime is used.
    fn representative_frametime(&mut self, sample: &Sample) -> f64 {
        let frametime = f64::from(sample.frametime_ms);
        let representative = match self.last_elapsed_ns {
            Some(prev) if sample.elapsed_ns > prev => {
                let delta_ms = (sample.elapsed_ns - prev) as f64 / 1_000_000.0;
                let frames = (delta_ms / frametime).round().max(1.0);
                delta_ms / frames
            }
            _ => frametime,
        };
        self.last_elapsed_ns = Some(sample.elapsed_ns);
        representative
    }
}

/// Discovers, connects to and drains a local frame-timing socket
pub struct TelemetryClient<D = SocketDiscovery, C = UnixConnector>
where
    D: Discover,
    C: Connector,
{
    config: ClientConfig,
    codec: PacketCodec,
    discovery: D,
    connector: C,
    state: ConnectionState,
    session: Option<Session<C::Stream>>,
    last_discovery: Option<Instant>,
    last_update: Option<Instant>,
    snapshot: MetricsSnapshot,
    history: MetricHistory,
}

impl TelemetryClient<SocketDiscovery, UnixConnector> {
    /// Create a client that scans the configured registry and connects over
    /// Unix sockets. Nothing is scanned until the first tick.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let discovery = SocketDiscovery::new(&config.registry_path, &config.socket_prefix);
        Self::with_parts(config, discovery, UnixConnector)
    }
}

impl<D: Discover, C: Connector> TelemetryClient<D, C> {
    /// Create a client with custom discovery and connection strategies
    pub fn with_parts(config: ClientConfig, discovery: D, connector: C) -> Result<Self> {
        config.validate()?;
        debug!(
            prefix = %config.socket_prefix,
            protocol = %config.protocol,
            interval_secs = config.discovery_interval_secs,
            "Telemetry client created"
        );
        Ok(Self {
            codec: PacketCodec::new(config.protocol),
            history: MetricHistory::new(config.history_len),
            config,
            discovery,
            connector,
            state: ConnectionState::Disconnected,
            session: None,
            last_discovery: None,
            last_update: None,
            snapshot: MetricsSnapshot::default(),
        })
    }

    /// Advance the client by one display tick
    pub fn tick(&mut self) -> TickReport {
        self.tick_at(Instant::now())
    }

    /// [`Self::tick`] with an explicit clock reading
    pub fn tick_at(&mut self, now: Instant) -> TickReport {
        if let Some(last) = self.last_update
            && now.saturating_duration_since(last) < self.config.min_update_interval()
        {
            trace!("Tick coalesced with previous update");
            return self.report(false);
        }
        self.last_update = Some(now);

        if self.session.is_none() {
            self.discover(now);
        }

        let fresh = self.session.is_some() && self.poll_session();
        self.report(fresh)
    }

    /// Drop the current connection, if any. Discovery resumes on the next
    /// scheduled tick.
    pub fn disconnect(&mut self) {
        if let Some(session) = &self.session {
            info!(owner_pid = session.endpoint.owner_pid, "Disconnecting from telemetry socket");
        }
        self.teardown();
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn owner_pid(&self) -> Option<u32> {
        self.state.owner_pid()
    }

    /// Endpoint of the current connection
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.session.as_ref().map(|s| &s.endpoint)
    }

    /// Rolling frametime window of the current connection
    pub fn window(&self) -> Option<&StatsWindow> {
        self.session.as_ref().map(|s| &s.window)
    }

    /// Graph history for `kind`, oldest first, NaN where unknown
    pub fn history(&self, kind: MetricKind) -> Vec<f64> {
        self.history.values(kind)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn report(&self, has_recent_data: bool) -> TickReport {
        TickReport { snapshot: self.snapshot, has_recent_data }
    }

    fn discovery_due(&self, now: Instant) -> bool {
        self.last_discovery.is_none_or(|last| {
            now.saturating_duration_since(last) >= self.config.discovery_interval()
        })
    }

    fn discover(&mut self, now: Instant) {
        if !self.discovery_due(now) {
            return;
        }
        // Recorded before the attempt so failures are rate-limited too
        self.last_discovery = Some(now);
        self.state = ConnectionState::Discovering;

        let Some(endpoint) = self.discovery.scan().into_iter().next() else {
            trace!("No telemetry endpoint available");
            self.state = ConnectionState::Disconnected;
            return;
        };

        match self.connector.connect(&endpoint) {
            Ok(stream) => {
                info!(
                    socket = %endpoint.socket_path,
                    owner_pid = endpoint.owner_pid,
                    version = %self.codec.version(),
                    "Connected to telemetry socket"
                );
                self.state = ConnectionState::Connected { owner_pid: endpoint.owner_pid };
                self.snapshot = MetricsSnapshot::connected(endpoint.owner_pid);
                self.history.reset();
                self.session = Some(Session {
                    reader: DrainingReader::new(stream, self.codec),
                    window: StatsWindow::new(),
                    last_elapsed_ns: None,
                    endpoint,
                });
            }
            Err(e) => {
                debug!(
                    error = %e,
                    socket = %endpoint.socket_path,
                    retryable = e.is_retryable(),
                    "Connection attempt failed"
                );
                self.state = ConnectionState::Disconnected;
            }
        }
    }

    /// Drain the connected socket; returns whether a new sample arrived
    fn poll_session(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        match session.reader.drain() {
            Ok(Some(sample)) => {
                let frametime = session.representative_frametime(&sample);
                session.window.push(frametime);

                let snapshot = &mut self.snapshot;
                snapshot.fps = sample.fps;
                snapshot.frametime_ms = f64::from(sample.frametime_ms);
                snapshot.one_percent_low = session.window.one_percent_low();
                snapshot.zero_one_percent_low = session.window.zero_one_percent_low();
                snapshot.average_fps = session.window.average_fps();
                snapshot.sample = Some(sample);
                self.history.record(&sample);

                trace!(
                    fps = sample.fps,
                    frametime_ms = frametime,
                    window = session.window.len(),
                    "Accepted sample"
                );
                true
            }
            Ok(None) => false,
            Err(e) => {
                let owner_pid = session.endpoint.owner_pid;
                let err = TelemetryError::from(e);
                if matches!(err, TelemetryError::Malformed(_)) {
                    warn!(
                        owner_pid,
                        error = %err,
                        suggestions = ?err.recovery_suggestions(),
                        "Dropping telemetry session"
                    );
                } else {
                    info!(owner_pid, error = %err, "Telemetry peer disconnected");
                }
                self.teardown();
                false
            }
        }
    }

    fn teardown(&mut self) {
        self.session = None;
        self.state = ConnectionState::Disconnected;
        self.snapshot = MetricsSnapshot::default();
        self.history.reset();
    }
}
