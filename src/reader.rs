//! Non-blocking drain-to-latest reader
//!
//! The producer writes one fixed-size frame per rendered frame, far faster than
//! a display refreshes. On every poll the reader consumes everything the kernel
//! has buffered and keeps only the newest decodable sample: freshness wins over
//! completeness.
//!
//! Frames arrive over a byte stream, so a read may end in the middle of a
//! frame. The partial tail is carried over to the next read or the next drain.
//!
//! The protocol version is never inferred, only checked. The first read of a
//! session must be a whole number of frames and the first complete frame must
//! decode; otherwise the producer speaks another layout and the reader fails
//! with [`DrainError::VersionMismatch`]. Once verified, a bad frame is only
//! dropped.

use std::io::{ErrorKind, Read};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::codec::{DecodeError, PacketCodec};
use crate::types::Sample;

/// Upper bound on read calls per drain so a producer writing faster than we
/// read cannot pin the caller
pub const MAX_READS_PER_DRAIN: usize = 1024;

/// Frames requested per read call
const FRAMES_PER_READ: usize = 32;

/// Fatal reader failure; the reader must be discarded
#[derive(Error, Debug)]
pub enum DrainError {
    #[error("peer disconnected")]
    Disconnected {
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("producer does not speak the configured protocol")]
    VersionMismatch {
        #[source]
        source: DecodeError,
    },
}

/// Outcome of a single non-blocking read
#[derive(Debug)]
pub enum ReadOutcome {
    /// `n > 0` bytes were read
    Data(usize),
    /// Nothing buffered right now
    WouldBlock,
    /// End of stream or a hard I/O error
    Closed(Option<std::io::Error>),
}

/// Perform one read, classifying the result without treating "no data" as an error
pub fn read_once<R: Read>(source: &mut R, buf: &mut [u8]) -> ReadOutcome {
    loop {
        match source.read(buf) {
            Ok(0) => return ReadOutcome::Closed(None),
            Ok(n) => return ReadOutcome::Data(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => return ReadOutcome::WouldBlock,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return ReadOutcome::Closed(Some(e)),
        }
    }
}

/// Errors a producer exiting or crashing normally causes
fn is_peer_gone(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::ConnectionReset | ErrorKind::BrokenPipe | ErrorKind::ConnectionAborted
    )
}

/// Drains a non-blocking stream of fixed-size frames, keeping the latest sample
pub struct DrainingReader<S> {
    source: S,
    codec: PacketCodec,
    scratch: Vec<u8>,
    pending: Vec<u8>,
    latest: Option<Sample>,
    verified: bool,
    frames_decoded: u64,
    frames_rejected: u64,
}

impl<S: Read> DrainingReader<S> {
    /// Wrap a stream that is already in non-blocking mode
    pub fn new(source: S, codec: PacketCodec) -> Self {
        let frame_len = codec.frame_len();
        Self {
            source,
            codec,
            scratch: vec![0u8; frame_len * FRAMES_PER_READ],
            pending: Vec::with_capacity(frame_len * 2),
            latest: None,
            verified: false,
            frames_decoded: 0,
            frames_rejected: 0,
        }
    }

    /// Consume every buffered frame and return the newest one decoded during
    /// this call.
    ///
    /// Returns `Ok(None)` when nothing new was buffered or nothing buffered
    /// decoded. After the first frame, malformed frames are dropped without
    /// affecting the connection.
    pub fn drain(&mut self) -> Result<Option<Sample>, DrainError> {
        let mut newest = None;

        for _ in 0..MAX_READS_PER_DRAIN {
            match read_once(&mut self.source, &mut self.scratch) {
                ReadOutcome::Data(n) => {
                    if !self.verified {
                        self.check_first_read(n)?;
                    }
                    self.pending.extend_from_slice(&self.scratch[..n]);
                    if let Some(sample) = self.decode_pending()? {
                        newest = Some(sample);
                    }
                }
                ReadOutcome::WouldBlock => break,
                ReadOutcome::Closed(source) => {
                    match &source {
                        Some(e) if !is_peer_gone(e) => {
                            warn!(error = %e, "Unexpected telemetry read error")
                        }
                        _ => debug!(error = ?source, "Telemetry stream closed"),
                    }
                    return Err(DrainError::Disconnected { source });
                }
            }
        }

        if let Some(sample) = newest {
            self.latest = Some(sample);
        }
        Ok(newest)
    }

    /// Whether the first frame of the session confirmed the protocol version
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Most recent sample decoded over the reader's lifetime
    pub fn latest(&self) -> Option<&Sample> {
        self.latest.as_ref()
    }

    pub fn codec(&self) -> PacketCodec {
        self.codec
    }

    /// Frames decoded successfully since construction
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Frames dropped as malformed since construction
    pub fn frames_rejected(&self) -> u64 {
        self.frames_rejected
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Producers write whole frames, so the first read must hold a whole
    /// number of them
    fn check_first_read(&self, n: usize) -> Result<(), DrainError> {
        let frame_len = self.codec.frame_len();
        if n % frame_len != 0 {
            let source = DecodeError::LengthMismatch {
                version: self.codec.version(),
                expected: frame_len,
                found: n,
            };
            warn!(error = %source, "First read does not match the configured protocol");
            return Err(DrainError::VersionMismatch { source });
        }
        Ok(())
    }

    /// Decode every complete frame in `pending`, returning the last valid one
    fn decode_pending(&mut self) -> Result<Option<Sample>, DrainError> {
        let frame_len = self.codec.frame_len();
        let complete = self.pending.len() / frame_len * frame_len;
        let mut newest = None;

        for frame in self.pending[..complete].chunks_exact(frame_len) {
            match self.codec.decode(frame) {
                Ok(sample) => {
                    self.verified = true;
                    self.frames_decoded += 1;
                    newest = Some(sample);
                }
                Err(source) if !self.verified => {
                    warn!(error = %source, "First frame does not match the configured protocol");
                    return Err(DrainError::VersionMismatch { source });
                }
                Err(e) => {
                    self.frames_rejected += 1;
                    debug!(error = %e, "Dropping malformed frame");
                }
            }
        }

        self.pending.drain(..complete);
        trace!(frames = complete / frame_len, carry = self.pending.len(), "Decoded buffered frames");
        Ok(newest)
    }
}

impl<S> std::fmt::Debug for DrainingReader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrainingReader")
            .field("version", &self.codec.version())
            .field("pending", &self.pending.len())
            .field("verified", &self.verified)
            .field("frames_decoded", &self.frames_decoded)
            .field("frames_rejected", &self.frames_rejected)
            .finish()
    }
}
