//! POST request construction
//!
//! The request head is fixed; only the path, the Host header and the
//! Content-Length vary. The body is streamed from files, never held in
//! memory as a whole.

use super::{Error, ParsedUrl, Result, CONTENT_TYPE, CRLF, TRANSFER_BUFFER_SIZE, USER_AGENT};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// One piece of the request body
///
/// The size is captured when the file is opened and is not checked
/// again before the bytes are sent.
#[derive(Debug)]
pub struct BodySegment {
    path: PathBuf,
    file: File,
    size: u64,
}

impl BodySegment {
    /// Open a regular file as a body segment
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::Open {
            path: path.clone(),
            source: e,
        })?;
        let meta = file.metadata().map_err(|e| Error::Open {
            path: path.clone(),
            source: e,
        })?;
        if !meta.is_file() {
            return Err(Error::NotRegularFile(path));
        }

        Ok(BodySegment {
            path,
            file,
            size: meta.len(),
        })
    }

    /// Size recorded at open time
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Copy the whole file to `writer`
    fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<u64> {
        let mut buffer = [0u8; TRANSFER_BUFFER_SIZE];
        let mut total = 0u64;

        loop {
            let n = match self.file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Read(e)),
            };
            writer.write_all(&buffer[..n]).map_err(Error::write)?;
            total += n as u64;
        }

        Ok(total)
    }
}

/// A complete POST request
#[derive(Debug)]
pub struct RequestPlan {
    path: String,
    host: String,
    segments: Vec<BodySegment>,
}

impl RequestPlan {
    /// Create a request for `url` whose body is `segments` in order
    pub fn new(url: &ParsedUrl, segments: Vec<BodySegment>) -> Self {
        RequestPlan {
            path: url.path().to_string(),
            host: url.hostport().to_string(),
            segments,
        }
    }

    /// Sum of the segment lengths captured at open time
    pub fn content_length(&self) -> u64 {
        self.segments.iter().map(BodySegment::size).sum()
    }

    /// Render the request line and headers, including the blank line
    pub fn head(&self) -> String {
        let mut head = String::with_capacity(256);
        head.push_str(&format!("POST {} HTTP/1.1{}", self.path, CRLF));
        head.push_str(&format!("Host: {}{}", self.host, CRLF));
        head.push_str(&format!("Connection: close{}", CRLF));
        head.push_str(&format!("User-Agent: {}{}", USER_AGENT, CRLF));
        head.push_str(&format!("Content-Type: {}{}", CONTENT_TYPE, CRLF));
        head.push_str(&format!("Content-Length: {}{}", self.content_length(), CRLF));
        head.push_str(CRLF);
        head
    }

    /// Write the head followed by every body segment
    ///
    /// Returns the number of body bytes written. Nothing is retracted on
    /// failure; whatever reached `writer` stays sent.
    pub fn write_to<W: Write>(mut self, writer: &mut W) -> Result<u64> {
        writer
            .write_all(self.head().as_bytes())
            .map_err(Error::write)?;

        let mut total = 0u64;
        for segment in &mut self.segments {
            let n = segment.write_to(writer)?;
            log::debug!("sent {} bytes from '{}'", n, segment.path.display());
            total += n;
        }

        writer.flush().map_err(Error::write)?;
        Ok(total)
    }
}
