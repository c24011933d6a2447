//! HTTP/1.1 POST client implementation
//!
//! This module provides the protocol side of httppost: URL parsing, request
//! writing, status line and header parsing, and body decoding.
//!
//! # Architecture
//!
//! The HTTP layer follows the same session operations abstraction used for
//! plain sockets:
//!
//! - `SessionOps` trait defines operations (poll, read, write, close)
//! - `HttpSession` adds an optional deadline to every read and write
//! - `LineReader` is the single bounded line primitive for the status line,
//!   header lines, chunk size lines, chunk terminators and trailers
//!
//! # Examples
//!
//! ```no_run
//! use httppost::http::{HttpClient, ParsedUrl, RequestPlan};
//! use httppost::http::session::FdSessionOps;
//!
//! let url = ParsedUrl::parse("http://127.0.0.1:8080/submit").unwrap();
//! let stream = httppost::net::connect(url.host(), url.port(), None).unwrap();
//! let mut client = HttpClient::new(FdSessionOps::new(stream));
//!
//! let plan = RequestPlan::new(&url, vec![]);
//! client.send_request(plan).unwrap();
//!
//! let (_status, headers) = client.receive_head().unwrap();
//! let mut out = Vec::new();
//! client.receive_body(headers.transfer_mode(), &mut out).unwrap();
//! ```

pub mod body;
pub mod chunked;
pub mod client;
pub mod line;
pub mod request;
pub mod response;
pub mod session;
pub mod sink;
pub mod url;

pub use client::{HttpClient, PostJob, PostSummary};
pub use line::LineReader;
pub use request::{BodySegment, RequestPlan};
pub use response::{HeaderResult, ResponseStatus, TransferMode};
pub use session::{HttpSession, SessionOps};
pub use sink::OutputSink;
pub use url::ParsedUrl;

use std::io;
use std::path::PathBuf;

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP operation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bad url '{0}'")]
    BadUrl(String),

    #[error(transparent)]
    Network(#[from] crate::net::Error),

    #[error("unable to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' is not a regular file", .0.display())]
    NotRegularFile(PathBuf),

    #[error("unable to create '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading input: {0}")]
    Read(#[source] io::Error),

    #[error("error writing output: {0}")]
    Write(#[source] io::Error),

    #[error("line too long")]
    LineTooLong,

    #[error("got unexpected EOF from server")]
    UnexpectedEof,

    #[error("bad response '{0}'")]
    BadResponse(String),

    #[error("POST command failed: '{0}'")]
    Http(String),

    #[error("malformed header '{0}'")]
    MalformedHeader(String),

    #[error("bad chunk line '{0}'")]
    BadChunkLine(String),

    #[error("Garbage after chunk data")]
    ChunkGarbage,

    #[error("Timeout")]
    Timeout,
}

impl Error {
    /// Classify an error from the read side of a transfer
    pub fn read(e: io::Error) -> Self {
        if is_timeout(&e) {
            Error::Timeout
        } else {
            Error::Read(e)
        }
    }

    /// Classify an error from the write side of a transfer
    pub fn write(e: io::Error) -> Self {
        if is_timeout(&e) {
            Error::Timeout
        } else {
            Error::Write(e)
        }
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: &str = "80";

/// CRLF line ending
pub const CRLF: &str = "\r\n";

/// Size of the per-operation transfer buffer
pub const TRANSFER_BUFFER_SIZE: usize = 1024;

/// Longest accepted protocol line, including the terminating LF
pub const MAX_LINE_LENGTH: usize = 1024;

/// Value of the User-Agent request header
pub const USER_AGENT: &str = concat!("httppost/", env!("CARGO_PKG_VERSION"));

/// Content-Type sent with every request body
pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
