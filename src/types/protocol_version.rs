//! Wire protocol versions for the frame-timing socket

use serde::{Deserialize, Serialize};

/// Frame layout spoken by a telemetry socket.
///
/// The version is a static configuration choice made before connecting. It is
/// never inferred from payload content: a frame of the wrong length is
/// malformed, not a hint to switch layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// 88-byte layout carrying memory usage, junction temperature and the
    /// producer-side 0.1% low / 97th percentile fields
    Legacy88,

    /// 60-byte layout used by current producers
    #[default]
    Current,
}

impl ProtocolVersion {
    /// Exact byte length of one frame in this layout
    pub const fn frame_len(self) -> usize {
        match self {
            ProtocolVersion::Legacy88 => 88,
            ProtocolVersion::Current => 60,
        }
    }

    /// Stable name used in configuration and logs
    pub const fn name(self) -> &'static str {
        match self {
            ProtocolVersion::Legacy88 => "legacy88",
            ProtocolVersion::Current => "current",
        }
    }

    /// Whether samples decoded with this layout carry [`crate::LegacyExtras`]
    pub const fn has_extras(self) -> bool {
        matches!(self, ProtocolVersion::Legacy88)
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} bytes)", self.name(), self.frame_len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_lengths_are_fixed() {
        assert_eq!(ProtocolVersion::Current.frame_len(), 60);
        assert_eq!(ProtocolVersion::Legacy88.frame_len(), 88);
    }

    #[test]
    fn default_is_current() {
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::Current);
        assert!(!ProtocolVersion::Current.has_extras());
        assert!(ProtocolVersion::Legacy88.has_extras());
    }

    #[test]
    fn deserializes_from_config_names() {
        let v: ProtocolVersion = serde_yaml_ng::from_str("legacy88").unwrap();
        assert_eq!(v, ProtocolVersion::Legacy88);
        let v: ProtocolVersion = serde_yaml_ng::from_str("current").unwrap();
        assert_eq!(v, ProtocolVersion::Current);
        assert!(serde_yaml_ng::from_str::<ProtocolVersion>("v3").is_err());
    }
}
