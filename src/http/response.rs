//! Response head parsing
//!
//! The status line is checked for a 2xx class and the header block is
//! scanned for exactly two fields: `Transfer-Encoding` and `Content-Length`.
//! Everything else is traced and dropped.

use super::{Error, LineReader, Result};
use std::io::BufRead;

/// Parsed status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStatus {
    major: u32,
    minor: u32,
    success: bool,
    rest: String,
}

impl ResponseStatus {
    /// HTTP major version
    pub fn major(&self) -> u32 {
        self.major
    }

    /// HTTP minor version
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Whether the status code starts with `2`
    ///
    /// Only the first digit is looked at, so `299` counts as success.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Status code and reason, as they appeared on the line
    pub fn rest(&self) -> &str {
        &self.rest
    }
}

/// How the response body is delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Exactly this many bytes follow the headers
    Identity(u64),
    /// Chunked transfer encoding
    Chunked,
}

/// What the header block says about the body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderResult {
    pub chunked: bool,
    pub content_length: u64,
}

impl HeaderResult {
    /// Pick the body decoder
    ///
    /// Chunked encoding wins over any Content-Length.
    pub fn transfer_mode(&self) -> TransferMode {
        if self.chunked {
            TransferMode::Chunked
        } else {
            TransferMode::Identity(self.content_length)
        }
    }
}

/// Parse a status line without judging the status code
///
/// Format: `HTTP/<major>.<minor> <code>...`, prefix matched
/// case-insensitively.
pub fn parse_status_line(line: &str) -> Result<ResponseStatus> {
    let bad = || Error::BadResponse(line.to_string());

    let rest = line
        .get(..5)
        .filter(|p| p.eq_ignore_ascii_case("http/"))
        .map(|_| &line[5..])
        .ok_or_else(bad)?;

    let (major, rest) = split_decimal(rest).ok_or_else(bad)?;
    let rest = rest.strip_prefix('.').ok_or_else(bad)?;
    let (minor, rest) = split_decimal(rest).ok_or_else(bad)?;

    if !rest.starts_with(|c: char| c.is_ascii_whitespace()) {
        return Err(bad());
    }
    let rest = skip_ws(rest);

    let first = rest.chars().next().ok_or_else(bad)?;
    if !first.is_ascii_digit() {
        return Err(bad());
    }

    Ok(ResponseStatus {
        major: major.try_into().map_err(|_| bad())?,
        minor: minor.try_into().map_err(|_| bad())?,
        success: first == '2',
        rest: rest.to_string(),
    })
}

/// Read the status line and require a 2xx class
pub fn read_status<R: BufRead>(lines: &mut LineReader<R>) -> Result<ResponseStatus> {
    let line = lines.expect_line()?;
    log::debug!("got status line '{}'", line);

    let status = parse_status_line(&line)?;
    if !status.is_success() {
        return Err(Error::Http(status.rest));
    }
    Ok(status)
}

/// Apply one header line to `result`
///
/// Continuation lines (leading whitespace) are ignored entirely; their text
/// is never folded into the previous field.
pub fn parse_header_line(line: &str, result: &mut HeaderResult) -> Result<()> {
    if line.starts_with(|c: char| c.is_ascii_whitespace()) {
        return Ok(());
    }

    let name_end = line
        .find(|c: char| c == ':' || c.is_ascii_whitespace())
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(name_end);

    if name.eq_ignore_ascii_case("Transfer-Encoding") {
        let value = field_value(line, rest)?;
        if is_chunked(value) {
            result.chunked = true;
        }
    } else if name.eq_ignore_ascii_case("Content-Length") {
        let value = field_value(line, rest)?;
        let malformed = || Error::MalformedHeader(line.to_string());

        let (length, trailing) = split_decimal(value).ok_or_else(malformed)?;
        if !skip_ws(trailing).is_empty() {
            return Err(malformed());
        }
        result.content_length = length;
    }

    Ok(())
}

/// Read header lines up to the blank line that ends them
pub fn read_headers<R: BufRead>(lines: &mut LineReader<R>) -> Result<HeaderResult> {
    let mut result = HeaderResult::default();

    loop {
        let line = lines.expect_line()?;
        if line.is_empty() {
            return Ok(result);
        }
        log::debug!("got line '{}'", line);
        parse_header_line(&line, &mut result)?;
    }
}

/// Skip optional whitespace, a colon, and more whitespace
fn field_value<'a>(line: &str, rest: &'a str) -> Result<&'a str> {
    skip_ws(rest)
        .strip_prefix(':')
        .map(skip_ws)
        .ok_or_else(|| Error::MalformedHeader(line.to_string()))
}

/// `chunked`, case-insensitive, followed by end of line or whitespace
fn is_chunked(value: &str) -> bool {
    const TOKEN: &str = "chunked";

    let Some(prefix) = value.get(..TOKEN.len()) else {
        return false;
    };
    prefix.eq_ignore_ascii_case(TOKEN)
        && value[TOKEN.len()..]
            .chars()
            .next()
            .map_or(true, |c| c.is_ascii_whitespace())
}

fn skip_ws(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_ascii_whitespace())
}

/// Split a leading unsigned decimal number off `s`
fn split_decimal(s: &str) -> Option<(u64, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}
