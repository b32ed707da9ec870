//! Connecting to discovered endpoints
//!
//! The [`Connector`] trait is the seam between the client state machine and
//! the operating system: it turns an [`Endpoint`] into a non-blocking byte
//! stream. [`UnixConnector`] is the real implementation; tests substitute
//! in-memory socket pairs.

use std::io::Read;

use crate::Result;
use crate::types::Endpoint;

mod unix;

pub use unix::UnixConnector;

/// Opens non-blocking streams to telemetry endpoints
pub trait Connector {
    /// Stream type handed to the [`crate::DrainingReader`]
    type Stream: Read;

    /// Connect to `endpoint` and put the stream in non-blocking mode.
    ///
    /// Must not block waiting for the producer: a socket that cannot be
    /// connected immediately is a failed attempt.
    fn connect(&mut self, endpoint: &Endpoint) -> Result<Self::Stream>;
}
