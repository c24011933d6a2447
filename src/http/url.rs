//! URL parsing
//!
//! Only the `http://host[:port][/path]` form is understood. No escaping or
//! query handling is performed; the path is passed to the server verbatim.

use super::{Error, Result, DEFAULT_HTTP_PORT};
use std::fmt;
use std::str::FromStr;

const HTTP_PREFIX: &str = "http://";

/// A URL split into the pieces the client needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    host: String,
    port: String,
    hostport: String,
    path: String,
}

impl ParsedUrl {
    /// Parse a URL string
    ///
    /// IPv6 literals are written in brackets (`http://[::1]:8080/`) and the
    /// brackets are removed from `host`. The port defaults to `80` and the
    /// path to `/`.
    pub fn parse(url: &str) -> Result<Self> {
        let has_prefix = url
            .get(..HTTP_PREFIX.len())
            .map_or(false, |p| p.eq_ignore_ascii_case(HTTP_PREFIX));
        if !has_prefix {
            return Err(Error::BadUrl(url.to_string()));
        }

        let rest = &url[HTTP_PREFIX.len()..];
        let (hostport, path) = match rest.find('/') {
            Some(pos) => rest.split_at(pos),
            None => (rest, ""),
        };
        if hostport.is_empty() {
            return Err(Error::BadUrl(url.to_string()));
        }
        let path = if path.is_empty() { "/" } else { path };

        let (host, port) = split_hostport(hostport).ok_or_else(|| Error::BadUrl(url.to_string()))?;

        Ok(ParsedUrl {
            host: host.to_string(),
            port: port.unwrap_or(DEFAULT_HTTP_PORT).to_string(),
            hostport: hostport.to_string(),
            path: path.to_string(),
        })
    }

    /// Host name or address, without IPv6 brackets
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port as written in the URL, or `80`
    pub fn port(&self) -> &str {
        &self.port
    }

    /// The `host[:port]` part exactly as it appeared in the URL
    pub fn hostport(&self) -> &str {
        &self.hostport
    }

    /// Request path, at least `/`
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl FromStr for ParsedUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ParsedUrl::parse(s)
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", HTTP_PREFIX, self.hostport, self.path)
    }
}

/// Split `host[:port]` into host and optional port.
///
/// The port separator is searched after any bracket pair, so the colons of
/// an IPv6 literal never terminate the host. Returns `None` for an empty
/// host or a malformed literal.
fn split_hostport(hostport: &str) -> Option<(&str, Option<&str>)> {
    let (host, after) = if let Some(literal) = hostport.strip_prefix('[') {
        let close = literal.find(']')?;
        if close == 0 {
            return None;
        }
        (&literal[..close], &literal[close + 1..])
    } else {
        match hostport.find(':') {
            Some(pos) => (&hostport[..pos], &hostport[pos..]),
            None => (hostport, ""),
        }
    };

    if host.is_empty() {
        return None;
    }

    let port = if after.is_empty() {
        None
    } else {
        // Anything between `]` and the port separator is malformed
        let port = after.strip_prefix(':')?;
        (!port.is_empty()).then_some(port)
    };

    Some((host, port))
}
