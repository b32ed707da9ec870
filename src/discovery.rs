//! Telemetry socket discovery
//!
//! Producers listen on a local socket named `<prefix>-<pid>`, usually in the
//! Linux abstract namespace. Discovery reads the kernel's local socket
//! registry (`/proc/net/unix`), keeps entries whose name matches the prefix
//! and recovers the owning process id from the numeric suffix.
//!
//! ```text
//! Num       RefCount Protocol Flags    Type St Inode Path
//! 0000000000000000: 00000002 00000000 00010000 0001 01 48213 @mangohud-4242
//! ```
//!
//! Finding nothing is the normal "no game running" state and yields an empty
//! list. Every scan reads the whole registry, so callers rate-limit it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::types::Endpoint;
use crate::{Result, TelemetryError};

/// Default location of the local socket registry
pub const DEFAULT_REGISTRY_PATH: &str = "/proc/net/unix";

/// Default socket name prefix
pub const DEFAULT_SOCKET_PREFIX: &str = "mangohud";

/// Column holding the socket path in the registry
const PATH_COLUMN: usize = 7;

/// Source of candidate endpoints for the client
pub trait Discover {
    /// Enumerate currently visible endpoints, best candidate first
    fn scan(&mut self) -> Vec<Endpoint>;
}

/// Scans the local socket registry for `<prefix>-<pid>` sockets
#[derive(Debug, Clone)]
pub struct SocketDiscovery {
    registry_path: PathBuf,
    prefix: String,
}

impl Default for SocketDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_PATH, DEFAULT_SOCKET_PREFIX)
    }
}

impl SocketDiscovery {
    pub fn new(registry_path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self { registry_path: registry_path.into(), prefix: prefix.into() }
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Read the registry and return matching endpoints.
    ///
    /// Only an unreadable registry is an error; unmatched or malformed lines
    /// are skipped.
    pub fn try_scan(&self) -> Result<Vec<Endpoint>> {
        let contents = std::fs::read_to_string(&self.registry_path)
            .map_err(|e| TelemetryError::discovery_failed(&self.registry_path, e))?;
        Ok(parse_registry(&contents, &self.prefix))
    }
}

impl Discover for SocketDiscovery {
    fn scan(&mut self) -> Vec<Endpoint> {
        match self.try_scan() {
            Ok(endpoints) => {
                if endpoints.is_empty() {
                    debug!(prefix = %self.prefix, "No telemetry sockets found");
                }
                endpoints
            }
            Err(e) => {
                debug!(error = %e, "Socket registry scan failed");
                Vec::new()
            }
        }
    }
}

/// Extract endpoints from registry text, in registry order without duplicates.
///
/// A listening socket shows up once per accepted connection as well, so the
/// same path can appear several times.
pub fn parse_registry(contents: &str, prefix: &str) -> Vec<Endpoint> {
    let mut seen = HashSet::new();
    let mut endpoints = Vec::new();

    for line in contents.lines() {
        let Some(path) = registry_line_path(line) else {
            continue;
        };
        let Some(owner_pid) = owner_pid_from_name(&path, prefix) else {
            continue;
        };
        if seen.insert(path.clone()) {
            trace!(socket = %path, owner_pid, "Found telemetry socket");
            endpoints.push(Endpoint { socket_path: path, owner_pid });
        }
    }

    endpoints
}

/// Path column of one registry line, if the line has one
fn registry_line_path(line: &str) -> Option<String> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.first().is_some_and(|c| c.eq_ignore_ascii_case("num")) {
        return None;
    }
    let path = columns.get(PATH_COLUMN..)?.join(" ");
    (!path.is_empty()).then_some(path)
}

/// Parse the pid from `<prefix>-<pid>`, looking only at the final name component
pub fn owner_pid_from_name(path: &str, prefix: &str) -> Option<u32> {
    let name = path.strip_prefix('@').unwrap_or(path);
    let name = name.rsplit('/').next()?;
    let digits = name.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|pid| *pid > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REGISTRY: &str = "\
Num       RefCount Protocol Flags    Type St Inode Path
0000000000000000: 00000002 00000000 00010000 0001 01 48213 @mangohud-4242
0000000000000000: 00000003 00000000 00000000 0001 03 48214 @mangohud-4242
0000000000000000: 00000002 00000000 00010000 0001 01 31337 /run/user/1000/bus
0000000000000000: 00000002 00000000 00000000 0002 01 11111
0000000000000000: 00000002 00000000 00010000 0001 01 48300 @mangohud-notapid
0000000000000000: 00000002 00000000 00010000 0001 01 48301 @mangohud-
0000000000000000: 00000002 00000000 00010000 0001 01 48302 @mangohudx-77
0000000000000000: 00000002 00000000 00010000 0001 01 48400 /tmp/sockets/mangohud-9001
garbage line
";

    #[test]
    fn parses_matching_entries_in_order() {
        let endpoints = parse_registry(REGISTRY, "mangohud");
        assert_eq!(
            endpoints,
            vec![
                Endpoint::new("@mangohud-4242", 4242),
                Endpoint::new("/tmp/sockets/mangohud-9001", 9001),
            ]
        );
    }

    #[test]
    fn no_match_is_empty_not_error() {
        assert!(parse_registry(REGISTRY, "gamescope").is_empty());
        assert!(parse_registry("", "mangohud").is_empty());
    }

    #[test]
    fn owner_pid_parsing() {
        assert_eq!(owner_pid_from_name("@mangohud-1", "mangohud"), Some(1));
        assert_eq!(owner_pid_from_name("/a/b/mangohud-22", "mangohud"), Some(22));
        assert_eq!(owner_pid_from_name("@mangohud-0", "mangohud"), None);
        assert_eq!(owner_pid_from_name("@mangohud-12a", "mangohud"), None);
        assert_eq!(owner_pid_from_name("@mangohud-+5", "mangohud"), None);
        assert_eq!(owner_pid_from_name("@mangohud-99999999999", "mangohud"), None);
        assert_eq!(owner_pid_from_name("@other-5", "mangohud"), None);
    }

    #[test]
    fn scans_registry_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REGISTRY.as_bytes()).unwrap();

        let mut discovery = SocketDiscovery::new(file.path(), "mangohud");
        assert_eq!(discovery.scan().len(), 2);
        // Restartable: a second scan sees the same entries
        assert_eq!(discovery.scan().len(), 2);
    }

    #[test]
    fn missing_registry_is_error_for_try_scan_only() {
        let mut discovery = SocketDiscovery::new("/nonexistent/registry", "mangohud");
        assert!(matches!(discovery.try_scan(), Err(TelemetryError::Discovery { .. })));
        assert!(discovery.scan().is_empty());
    }
}
