//! Network utilities
//!
//! Name resolution and connection establishment. Everything below the HTTP
//! layer lives here: the protocol code only ever sees a connected stream.

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::ffi::CString;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Result type for network operations
pub type Result<T> = std::result::Result<T, Error>;

/// Network errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid port '{0}'")]
    InvalidPort(String),

    #[error("unable to resolve '{host}': {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to connect to '{host}': {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
}

/// Resolve `host:port` to an ordered list of stream socket candidates.
///
/// `port` is a decimal number or a TCP service name such as `http`. The
/// order is the resolver's order. An empty result is reported as a
/// resolution failure.
pub fn resolve(host: &str, port: &str) -> Result<Vec<SocketAddr>> {
    let port = match port.parse::<u16>() {
        Ok(port) => port,
        Err(_) => service_port(port).ok_or_else(|| Error::InvalidPort(port.to_string()))?,
    };

    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| Error::Resolve {
            host: host.to_string(),
            source: e,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(Error::Resolve {
            host: host.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
        });
    }

    Ok(addrs)
}

/// Connect to the first candidate that accepts a connection.
///
/// Candidates are tried in order with socket-create-then-connect; only the
/// last error is kept if every candidate fails.
pub fn connect_any(
    host: &str,
    addrs: &[SocketAddr],
    timeout: Option<Duration>,
) -> Result<TcpStream> {
    let mut last_err = io::Error::new(io::ErrorKind::NotFound, "no addresses to connect to");

    for addr in addrs {
        log::debug!("trying {}", addr);
        match connect_one(addr, timeout) {
            Ok(stream) => {
                log::info!("connected to {} ({})", host, addr);
                return Ok(stream);
            }
            Err(e) => {
                log::debug!("connect to {} failed: {}", addr, e);
                last_err = e;
            }
        }
    }

    Err(Error::Connect {
        host: host.to_string(),
        source: last_err,
    })
}

/// Resolve and connect in one step
pub fn connect(host: &str, port: &str, timeout: Option<Duration>) -> Result<TcpStream> {
    let addrs = resolve(host, port)?;
    connect_any(host, &addrs, timeout)
}

/// Look up a TCP service name in the system services database
pub fn service_port(service: &str) -> Option<u16> {
    let name = CString::new(service).ok()?;
    let proto = b"tcp\0";

    let entry = unsafe { libc::getservbyname(name.as_ptr(), proto.as_ptr().cast()) };
    if entry.is_null() {
        return None;
    }
    // s_port holds the port in network byte order
    let raw = unsafe { (*entry).s_port };
    Some(u16::from_be(raw as u16))
}

fn connect_one(addr: &SocketAddr, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(*addr), Type::STREAM, Some(Protocol::TCP))?;
    let sock_addr = SockAddr::from(*addr);

    match timeout {
        Some(t) => socket.connect_timeout(&sock_addr, t)?,
        None => socket.connect(&sock_addr)?,
    }

    Ok(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_resolve_numeric() {
        let addrs = resolve("127.0.0.1", "8080").unwrap();
        assert_eq!(addrs, vec!["127.0.0.1:8080".parse::<SocketAddr>().unwrap()]);
    }

    #[test]
    fn test_resolve_ipv6_literal() {
        let addrs = resolve("::1", "80").unwrap();
        assert!(addrs[0].is_ipv6());
        assert_eq!(addrs[0].port(), 80);
    }

    #[test]
    fn test_resolve_unknown_service() {
        let err = resolve("127.0.0.1", "no-such-service-xyz").unwrap_err();
        assert!(matches!(err, Error::InvalidPort(p) if p == "no-such-service-xyz"));
    }

    #[test]
    fn test_resolve_service_name() {
        // Minimal systems may ship without a services database
        if let Some(port) = service_port("http") {
            assert_eq!(port, 80);
            let addrs = resolve("127.0.0.1", "http").unwrap();
            assert_eq!(addrs[0].port(), 80);
        }
    }

    #[test]
    fn test_service_port_rejects_nul() {
        assert_eq!(service_port("ht\0tp"), None);
    }

    #[test]
    fn test_connect_first_working_candidate() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let good = listener.local_addr().unwrap();

        // Grab a free port and release it so nothing is listening there.
        let dead = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

        let stream = connect_any("localhost", &[dead, good], None).unwrap();
        assert_eq!(stream.peer_addr().unwrap(), good);
    }

    #[test]
    fn test_connect_all_fail_keeps_last_error() {
        let dead = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

        let err = connect_any("localhost", &[dead], Some(Duration::from_secs(1))).unwrap_err();
        match err {
            Error::Connect { host, source } => {
                assert_eq!(host, "localhost");
                assert_eq!(source.kind(), io::ErrorKind::ConnectionRefused);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_connect_no_candidates() {
        let err = connect_any("nowhere", &[], None).unwrap_err();
        assert!(matches!(err, Error::Connect { .. }));
    }
}
