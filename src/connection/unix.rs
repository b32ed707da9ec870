//! Unix domain socket connector

use crate::Result;
use crate::types::Endpoint;

#[cfg(unix)]
use {
    crate::TelemetryError,
    std::os::unix::net::UnixStream,
    tracing::{debug, trace},
};

use super::Connector;

/// Connects to telemetry sockets in the abstract namespace or on the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixConnector;

#[cfg(unix)]
impl UnixConnector {
    fn open(endpoint: &Endpoint) -> std::io::Result<UnixStream> {
        match endpoint.abstract_name() {
            Some(name) => connect_abstract(name),
            None => UnixStream::connect(&endpoint.socket_path),
        }
    }
}

#[cfg(unix)]
impl Connector for UnixConnector {
    type Stream = UnixStream;

    fn connect(&mut self, endpoint: &Endpoint) -> Result<UnixStream> {
        trace!(socket = %endpoint.socket_path, "Connecting to telemetry socket");

        let stream = Self::open(endpoint).map_err(|e| {
            TelemetryError::connection_failed_with_source(
                format!("{} unreachable", endpoint),
                Box::new(e),
            )
        })?;

        stream.set_nonblocking(true).map_err(|e| {
            TelemetryError::connection_failed_with_source(
                "failed to enable non-blocking mode",
                Box::new(e),
            )
        })?;

        debug!(socket = %endpoint.socket_path, owner_pid = endpoint.owner_pid, "Socket connected");
        Ok(stream)
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn connect_abstract(name: &str) -> std::io::Result<UnixStream> {
    #[cfg(target_os = "android")]
    use std::os::android::net::SocketAddrExt;
    #[cfg(target_os = "linux")]
    use std::os::linux::net::SocketAddrExt;
    use std::os::unix::net::SocketAddr;

    let addr = SocketAddr::from_abstract_name(name.as_bytes())?;
    UnixStream::connect_addr(&addr)
}

#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
fn connect_abstract(_name: &str) -> std::io::Result<UnixStream> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "abstract socket namespace is Linux-only",
    ))
}

// Non-Unix stub implementation
#[cfg(not(unix))]
impl Connector for UnixConnector {
    type Stream = std::io::Empty;

    /// Always fails: local telemetry sockets only exist on Unix hosts.
    fn connect(&mut self, _endpoint: &Endpoint) -> Result<std::io::Empty> {
        Err(crate::TelemetryError::unsupported_platform("Telemetry socket connection", "Unix"))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::{ErrorKind, Read};
    use std::os::unix::net::UnixListener;

    #[test]
    fn connects_filesystem_socket_nonblocking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mangohud-321");
        let _listener = UnixListener::bind(&path).unwrap();

        let endpoint = Endpoint::new(path.to_string_lossy(), 321);
        let mut stream = UnixConnector.connect(&endpoint).unwrap();

        let mut buf = [0u8; 8];
        let err = stream.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WouldBlock);
    }

    #[test]
    fn missing_socket_is_connection_error() {
        let endpoint = Endpoint::new("/nonexistent/mangohud-1", 1);
        let err = UnixConnector.connect(&endpoint).unwrap_err();
        assert!(matches!(err, crate::TelemetryError::Connection { .. }));
        assert!(err.is_retryable());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn connects_abstract_socket() {
        use std::os::linux::net::SocketAddrExt;
        use std::os::unix::net::SocketAddr;

        let name = format!("framewatch-test-{}", std::process::id());
        let addr = SocketAddr::from_abstract_name(name.as_bytes()).unwrap();
        let _listener = UnixListener::bind_addr(&addr).unwrap();

        let endpoint = Endpoint::new(format!("@{name}"), std::process::id());
        assert!(UnixConnector.connect(&endpoint).is_ok());
    }
}
