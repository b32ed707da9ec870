//! Test utilities: sample builders and scripted stand-ins for the OS
//!
//! These helpers let the reader and client be exercised without a running
//! game: [`ScriptedSource`] replays canned read results, [`ScriptedDiscovery`]
//! returns whatever endpoints a test sets, and [`PairConnector`] hands out one
//! end of a Unix socket pair while keeping the producer end for the test.

#![cfg(any(test, feature = "benchmark"))]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::rc::Rc;

use crate::discovery::Discover;
use crate::types::{Endpoint, LegacyExtras, Sample};

/// Current-layout sample with plausible auxiliary values
pub fn sample_with_frametime(frametime_ms: f32) -> Sample {
    Sample {
        fps: if frametime_ms > 0.0 { 1000.0 / f64::from(frametime_ms) } else { 0.0 },
        frametime_ms,
        cpu_load: 37.5,
        cpu_power_w: 65.0,
        cpu_mhz: 4700,
        gpu_load: 97,
        cpu_temp_c: 71,
        gpu_temp_c: 68,
        gpu_core_clock_mhz: 2610,
        gpu_mem_clock_mhz: 1250,
        gpu_power_w: 245,
        fps_1_percent_low: 0.0,
        elapsed_ns: 0,
        extras: None,
    }
}

/// Legacy-layout sample with every extra field populated
pub fn legacy_sample(frametime_ms: f32) -> Sample {
    Sample {
        elapsed_ns: 1_234_567_890,
        extras: Some(LegacyExtras {
            gpu_vram_used_gb: 7.25,
            ram_used_gb: 14.5,
            swap_used_gb: 0.5,
            process_rss_gb: 3.75,
            gpu_junction_temp_c: 84,
            fps_0_1_percent_low: 61.0,
            fps_97th_percentile: 118.0,
        }),
        ..sample_with_frametime(frametime_ms)
    }
}

/// What a [`ScriptedSource`] does once its chunks run out
#[derive(Debug, Clone, Copy)]
enum ScriptEnd {
    WouldBlock,
    Eof,
    Error(ErrorKind),
}

/// In-memory non-blocking stream replaying canned reads.
///
/// Each chunk is returned by successive reads (split if the caller's buffer is
/// smaller). An empty chunk produces one `WouldBlock`.
#[derive(Debug)]
pub struct ScriptedSource {
    chunks: VecDeque<Vec<u8>>,
    end: ScriptEnd,
}

impl ScriptedSource {
    /// Replay `chunks`, then report `WouldBlock` forever
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self { chunks: chunks.into(), end: ScriptEnd::WouldBlock }
    }

    /// A stream whose peer already closed
    pub fn closed() -> Self {
        Self { chunks: VecDeque::new(), end: ScriptEnd::Eof }
    }

    /// A stream that fails with `kind` on first read
    pub fn failing(kind: ErrorKind) -> Self {
        Self { chunks: VecDeque::new(), end: ScriptEnd::Error(kind) }
    }
}

impl Read for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return match self.end {
                ScriptEnd::WouldBlock => Err(ErrorKind::WouldBlock.into()),
                ScriptEnd::Eof => Ok(0),
                ScriptEnd::Error(kind) => Err(kind.into()),
            };
        };

        if chunk.is_empty() {
            return Err(ErrorKind::WouldBlock.into());
        }

        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            chunk.drain(..n);
            self.chunks.push_front(chunk);
        }
        Ok(n)
    }
}

#[derive(Debug, Default)]
struct DiscoveryScript {
    endpoints: Vec<Endpoint>,
    scans: usize,
}

/// Discovery returning endpoints set by the test; clones share state
#[derive(Debug, Clone, Default)]
pub struct ScriptedDiscovery {
    script: Rc<RefCell<DiscoveryScript>>,
}

impl ScriptedDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_endpoints(&self, endpoints: Vec<Endpoint>) {
        self.script.borrow_mut().endpoints = endpoints;
    }

    /// Number of scans performed so far
    pub fn scans(&self) -> usize {
        self.script.borrow().scans
    }
}

impl Discover for ScriptedDiscovery {
    fn scan(&mut self) -> Vec<Endpoint> {
        let mut script = self.script.borrow_mut();
        script.scans += 1;
        script.endpoints.clone()
    }
}

#[cfg(unix)]
pub use pair::PairConnector;

#[cfg(unix)]
mod pair {
    use super::*;
    use crate::connection::Connector;
    use crate::{Result, TelemetryError};
    use std::os::unix::net::UnixStream;

    #[derive(Debug, Default)]
    struct PairState {
        producers: Vec<UnixStream>,
        attempts: usize,
        refuse: bool,
    }

    /// Connector backed by `UnixStream::pair`; the test keeps the producer end
    #[derive(Debug, Clone, Default)]
    pub struct PairConnector {
        state: Rc<RefCell<PairState>>,
    }

    impl PairConnector {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make subsequent connection attempts fail
        pub fn refuse(&self, refuse: bool) {
            self.state.borrow_mut().refuse = refuse;
        }

        pub fn attempts(&self) -> usize {
            self.state.borrow().attempts
        }

        /// Producer end of the most recent successful connection
        pub fn take_producer(&self) -> Option<UnixStream> {
            self.state.borrow_mut().producers.pop()
        }
    }

    impl Connector for PairConnector {
        type Stream = UnixStream;

        fn connect(&mut self, endpoint: &Endpoint) -> Result<UnixStream> {
            let mut state = self.state.borrow_mut();
            state.attempts += 1;
            if state.refuse {
                return Err(TelemetryError::connection_failed(format!("{endpoint} refused")));
            }
            let (producer, consumer) = UnixStream::pair()
                .map_err(|e| TelemetryError::connection_failed_with_source("pair", Box::new(e)))?;
            consumer
                .set_nonblocking(true)
                .map_err(|e| TelemetryError::connection_failed_with_source("pair", Box::new(e)))?;
            state.producers.push(producer);
            Ok(consumer)
        }
    }
}
