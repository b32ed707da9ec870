//! Core types for frame-timing telemetry.
//!
//! - [`Sample`] is one decoded packet, with [`LegacyExtras`] for the older layout
//! - [`ProtocolVersion`] selects the fixed frame layout for a connection
//! - [`Endpoint`] is a discovered socket owned by a game process
//! - [`ConnectionState`] is the client's lifecycle state as seen by callers
//!
//! ## Usage Example
//!
//! ```rust
//! use framewatch::types::{ProtocolVersion, Sample};
//!
//! let sample = Sample { fps: 144.0, frametime_ms: 6.94, ..Default::default() };
//! assert!(sample.frametime_fps() > 144.0);
//! assert_eq!(ProtocolVersion::Current.frame_len(), 60);
//! ```

mod endpoint;
mod protocol_version;
mod sample;

pub use endpoint::{ConnectionState, Endpoint};
pub use protocol_version::ProtocolVersion;
pub use sample::{LegacyExtras, Sample};
