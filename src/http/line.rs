//! Bounded line reading
//!
//! Every line-oriented part of a response (status line, header lines, chunk
//! size lines, chunk terminators and trailers) goes through `LineReader`.

use super::{Error, Result, MAX_LINE_LENGTH};
use std::io::{BufRead, Read};

/// Reads LF-terminated lines from a buffered stream
///
/// Lines are returned without the LF and without a CR directly before it.
/// A line longer than the limit (LF included) fails with `LineTooLong`.
/// The underlying reader stays available for the body bytes that follow
/// the line-oriented parts.
pub struct LineReader<R> {
    inner: R,
    limit: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Create a line reader with the default limit
    pub fn new(inner: R) -> Self {
        Self::with_limit(inner, MAX_LINE_LENGTH)
    }

    /// Create a line reader accepting lines of at most `limit` bytes
    pub fn with_limit(inner: R, limit: usize) -> Self {
        LineReader {
            inner,
            limit,
            buf: Vec::with_capacity(limit),
            done: false,
        }
    }

    /// Read the next line
    ///
    /// Returns `Ok(None)` if the stream ends before any byte of a new line.
    /// A stream that ends in the middle of a line is `UnexpectedEof`.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();

        let n = (&mut self.inner)
            .take(self.limit as u64)
            .read_until(b'\n', &mut self.buf)
            .map_err(Error::read)?;

        if n == 0 {
            return Ok(None);
        }

        if self.buf.last() != Some(&b'\n') {
            if n >= self.limit {
                return Err(Error::LineTooLong);
            }
            return Err(Error::UnexpectedEof);
        }

        self.buf.pop();
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    /// Read the next line, treating end of stream as an error
    pub fn expect_line(&mut self) -> Result<String> {
        self.next_line()?.ok_or(Error::UnexpectedEof)
    }

    /// Get a mutable reference to the underlying reader
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_crlf_and_lf_lines() {
        let mut lines = LineReader::new(Cursor::new(&b"one\r\ntwo\nthree\r\n"[..]));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("one"));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("two"));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("three"));
        assert_eq!(lines.next_line().unwrap(), None);
    }

    #[test]
    fn test_only_trailing_cr_stripped() {
        let mut lines = LineReader::new(Cursor::new(&b"a\rb\r\r\n"[..]));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("a\rb\r"));
    }

    #[test]
    fn test_empty_line() {
        let mut lines = LineReader::new(Cursor::new(&b"\r\n"[..]));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_line_too_long() {
        let mut lines = LineReader::with_limit(Cursor::new(&b"abcdefgh\n"[..]), 4);
        assert!(matches!(lines.next_line(), Err(Error::LineTooLong)));
    }

    #[test]
    fn test_line_at_limit() {
        let mut lines = LineReader::with_limit(Cursor::new(&b"abc\ndef"[..]), 4);
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_unterminated_line() {
        let mut lines = LineReader::new(Cursor::new(&b"partial"[..]));
        assert!(matches!(lines.next_line(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_expect_line_at_eof() {
        let mut lines = LineReader::new(Cursor::new(&b""[..]));
        assert!(matches!(lines.expect_line(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_iterator_is_fused_after_error() {
        let lines = LineReader::with_limit(Cursor::new(&b"ok\ntoolong\nok\n"[..]), 4);
        let items: Vec<_> = lines.collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "ok");
        assert!(matches!(items[1], Err(Error::LineTooLong)));
    }

    #[test]
    fn test_remaining_bytes_stay_readable() {
        let mut lines = LineReader::new(Cursor::new(&b"head\r\nbody"[..]));
        lines.expect_line().unwrap();

        let mut rest = String::new();
        lines.get_mut().read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "body");
    }
}
