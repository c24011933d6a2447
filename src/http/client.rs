//! HTTP client implementation
//!
//! `HttpClient` drives one request/response exchange over a session.
//! `PostJob` is the complete invocation: open the body files, connect, send,
//! check the response and copy the body to the output sink.

use super::{
    body, chunked::ChunkedDecoder, response, BodySegment, Error, HeaderResult, HttpSession,
    LineReader, OutputSink, ParsedUrl, RequestPlan, ResponseStatus, Result, SessionOps,
    TransferMode, TRANSFER_BUFFER_SIZE,
};
use crate::http::session::FdSessionOps;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

/// HTTP client
///
/// Provides methods for sending the request and receiving the response.
pub struct HttpClient<S: SessionOps> {
    lines: LineReader<BufReader<HttpSession<S>>>,
}

impl<S: SessionOps> HttpClient<S> {
    /// Create a new HTTP client with a session
    pub fn new(session: S) -> Self {
        Self::from_session(HttpSession::new(session))
    }

    /// Create a client from an already configured session
    pub fn from_session(session: HttpSession<S>) -> Self {
        HttpClient {
            lines: LineReader::new(BufReader::with_capacity(TRANSFER_BUFFER_SIZE, session)),
        }
    }

    /// Set the timeout for every read and write
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.session_mut().set_timeout(timeout);
    }

    /// Send the request head and body
    ///
    /// Returns the number of body bytes sent.
    pub fn send_request(&mut self, plan: RequestPlan) -> Result<u64> {
        let mut writer = BufWriter::with_capacity(TRANSFER_BUFFER_SIZE, self.session_mut());
        plan.write_to(&mut writer)
    }

    /// Receive the status line and headers
    ///
    /// Fails with `Error::Http` unless the status is in the 2xx class.
    pub fn receive_head(&mut self) -> Result<(ResponseStatus, HeaderResult)> {
        let status = response::read_status(&mut self.lines)?;
        let headers = response::read_headers(&mut self.lines)?;
        Ok((status, headers))
    }

    /// Receive the body framed as `mode` into `output`
    pub fn receive_body<W: Write>(&mut self, mode: TransferMode, output: &mut W) -> Result<u64> {
        let received = match mode {
            TransferMode::Chunked => ChunkedDecoder::new().decode(&mut self.lines, output)?,
            TransferMode::Identity(len) => body::copy_bytes(self.lines.get_mut(), output, len)?,
        };
        output.flush().map_err(Error::write)?;
        Ok(received)
    }

    /// Close the connection
    pub fn close(&mut self) -> Result<()> {
        self.session_mut().close().map_err(Error::write)
    }

    /// Get a mutable reference to the underlying session
    pub fn session_mut(&mut self) -> &mut HttpSession<S> {
        self.lines.get_mut().get_mut()
    }
}

/// Result of a successful POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub status: ResponseStatus,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// One complete POST invocation
#[derive(Debug, Clone)]
pub struct PostJob {
    pub url: ParsedUrl,
    pub post_file: PathBuf,
    pub post_header: Option<PathBuf>,
    pub post_footer: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub delete_file: bool,
    pub timeout: Option<Duration>,
}

impl PostJob {
    /// Create a job posting `post_file` to `url`, writing to stdout
    pub fn new(url: ParsedUrl, post_file: impl Into<PathBuf>) -> Self {
        PostJob {
            url,
            post_file: post_file.into(),
            post_header: None,
            post_footer: None,
            output: None,
            delete_file: false,
            timeout: None,
        }
    }

    /// Run the exchange
    ///
    /// All body files are opened before connecting. The output is created
    /// only once a 2xx status and a valid header block have been received.
    pub fn run(&self) -> Result<PostSummary> {
        let header = self.post_header.as_ref().map(BodySegment::open).transpose()?;
        let footer = self.post_footer.as_ref().map(BodySegment::open).transpose()?;
        let main = BodySegment::open(&self.post_file)?;

        let segments = header
            .into_iter()
            .chain(Some(main))
            .chain(footer)
            .collect();
        let plan = RequestPlan::new(&self.url, segments);
        log::debug!(
            "posting {} bytes to {}",
            plan.content_length(),
            self.url
        );

        let stream = crate::net::connect(self.url.host(), self.url.port(), self.timeout)?;
        let mut client = HttpClient::new(FdSessionOps::new(stream));
        client.set_timeout(self.timeout);

        let bytes_sent = client.send_request(plan)?;
        let (status, headers) = client.receive_head()?;

        let mut output = OutputSink::open(self.output.as_deref())?;
        let bytes_received = client.receive_body(headers.transfer_mode(), &mut output)?;

        if let Err(e) = client.close() {
            log::debug!("close failed: {}", e);
        }

        if self.delete_file {
            if let Err(e) = fs::remove_file(&self.post_file) {
                log::warn!("unable to delete '{}': {}", self.post_file.display(), e);
            }
        }

        Ok(PostSummary {
            status,
            bytes_sent,
            bytes_received,
        })
    }
}
