//! Chunked transfer encoding support
//!
//! This module provides decoding for HTTP chunked transfer encoding over a
//! `LineReader`, plus an encoder for producing chunked framing.

use super::{body, Error, LineReader, Result, CRLF};
use std::io::{BufRead, Write};

/// Chunked encoder
///
/// Encodes data in HTTP chunked transfer encoding format
pub struct ChunkedEncoder<W: Write> {
    writer: W,
}

impl<W: Write> ChunkedEncoder<W> {
    /// Create a new chunked encoder
    pub fn new(writer: W) -> Self {
        ChunkedEncoder { writer }
    }

    /// Write a chunk of data
    ///
    /// Empty input is skipped, since a zero-size chunk ends the body.
    pub fn write_chunk(&mut self, data: &[u8]) -> std::io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        write!(self.writer, "{:x}{}", data.len(), CRLF)?;
        self.writer.write_all(data)?;
        self.writer.write_all(CRLF.as_bytes())
    }

    /// Write the final chunk and the given trailer lines
    pub fn finish_with_trailers(&mut self, trailers: &[&str]) -> std::io::Result<()> {
        write!(self.writer, "0{}", CRLF)?;
        for trailer in trailers {
            write!(self.writer, "{}{}", trailer, CRLF)?;
        }
        self.writer.write_all(CRLF.as_bytes())?;
        self.writer.flush()
    }

    /// Write the final chunk (0-sized chunk)
    pub fn finish(&mut self) -> std::io::Result<()> {
        self.finish_with_trailers(&[])
    }

    /// Consume the encoder and return the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Chunked decoder
///
/// Pulls framing lines from a `LineReader` and copies chunk data to the
/// output without buffering more than one transfer buffer at a time.
#[derive(Debug)]
pub struct ChunkedDecoder {
    state: DecoderState,
    decoded: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DecoderState {
    ChunkSize,
    ChunkData(u64),
    ChunkEnd,
    Trailer,
    Complete,
}

impl ChunkedDecoder {
    /// Create a new chunked decoder
    pub fn new() -> Self {
        ChunkedDecoder {
            state: DecoderState::ChunkSize,
            decoded: 0,
        }
    }

    /// Decode the whole chunked body, writing data to `output`
    ///
    /// Returns the number of decoded bytes. Trailer fields are read and
    /// discarded.
    pub fn decode<R: BufRead, W: Write>(
        &mut self,
        lines: &mut LineReader<R>,
        output: &mut W,
    ) -> Result<u64> {
        loop {
            self.state = match self.state {
                DecoderState::ChunkSize => {
                    let line = lines.expect_line()?;
                    log::debug!("got chunk line '{}'", line);
                    match parse_chunk_size(&line)? {
                        0 => DecoderState::Trailer,
                        size => DecoderState::ChunkData(size),
                    }
                }

                DecoderState::ChunkData(size) => {
                    self.decoded += body::copy_bytes(lines.get_mut(), output, size)?;
                    DecoderState::ChunkEnd
                }

                DecoderState::ChunkEnd => {
                    if !lines.expect_line()?.is_empty() {
                        return Err(Error::ChunkGarbage);
                    }
                    DecoderState::ChunkSize
                }

                DecoderState::Trailer => {
                    let line = lines.expect_line()?;
                    if line.is_empty() {
                        DecoderState::Complete
                    } else {
                        log::debug!("got end-of-chunk line '{}'", line);
                        DecoderState::Trailer
                    }
                }

                DecoderState::Complete => return Ok(self.decoded),
            };
        }
    }

    /// Check if decoding is complete
    pub fn is_complete(&self) -> bool {
        self.state == DecoderState::Complete
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a chunk size line
///
/// Hex digits with optional surrounding whitespace. Chunk extensions are
/// not accepted.
pub fn parse_chunk_size(line: &str) -> Result<u64> {
    let bad = || Error::BadChunkLine(line.to_string());

    let trimmed = line.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let end = trimmed
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(trimmed.len());
    let (digits, rest) = trimmed.split_at(end);

    if digits.is_empty() || !rest.chars().all(|c| c.is_ascii_whitespace()) {
        return Err(bad());
    }

    u64::from_str_radix(digits, 16).map_err(|_| bad())
}

/// Decode a complete chunked body held in memory
pub fn decode_chunked_body(input: &[u8]) -> Result<Vec<u8>> {
    let mut lines = LineReader::new(input);
    let mut output = Vec::new();
    ChunkedDecoder::new().decode(&mut lines, &mut output)?;
    Ok(output)
}

/// Encode data as chunked body
pub fn encode_chunked_body(data: &[u8], chunk_size: usize) -> std::io::Result<Vec<u8>> {
    let mut encoder = ChunkedEncoder::new(Vec::new());

    for chunk in data.chunks(chunk_size.max(1)) {
        encoder.write_chunk(chunk)?;
    }
    encoder.finish()?;

    Ok(encoder.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::TRANSFER_BUFFER_SIZE;
    use std::io::{Cursor, Read};

    #[test]
    fn test_decode_single_chunk() {
        let output = decode_chunked_body(b"4\r\nWiki\r\n0\r\n\r\n").unwrap();
        assert_eq!(output, b"Wiki");
    }

    #[test]
    fn test_decode_multiple_chunks() {
        let input = b"5\r\nHello\r\n5\r\nWorld\r\n0\r\n\r\n";
        let output = decode_chunked_body(input).unwrap();
        assert_eq!(output, b"HelloWorld");
    }

    #[test]
    fn test_decode_uppercase_hex_and_lf_only() {
        let input = b"A\nabcdefghij\n0\n\n";
        assert_eq!(decode_chunked_body(input).unwrap(), b"abcdefghij");
    }

    #[test]
    fn test_decode_chunk_larger_than_buffer() {
        let data = vec![b'z'; TRANSFER_BUFFER_SIZE * 2 + 5];
        let encoded = encode_chunked_body(&data, data.len()).unwrap();
        assert_eq!(decode_chunked_body(&encoded).unwrap(), data);
    }

    #[test]
    fn test_decode_discards_trailers() {
        let mut encoder = ChunkedEncoder::new(Vec::new());
        encoder.write_chunk(b"data").unwrap();
        encoder.finish_with_trailers(&["Expires: never", "X-Check: 1"]).unwrap();

        let output = decode_chunked_body(&encoder.into_inner()).unwrap();
        assert_eq!(output, b"data");
    }

    #[test]
    fn test_decode_stops_after_body() {
        let mut lines = LineReader::new(Cursor::new(&b"3\r\nabc\r\n0\r\n\r\nNEXT"[..]));
        let mut output = Vec::new();
        let mut decoder = ChunkedDecoder::new();

        assert_eq!(decoder.decode(&mut lines, &mut output).unwrap(), 3);
        assert!(decoder.is_complete());

        let mut rest = String::new();
        lines.get_mut().read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "NEXT");
    }

    #[test]
    fn test_garbage_after_chunk_data() {
        let result = decode_chunked_body(b"3\r\nabcd\r\n0\r\n\r\n");
        assert!(matches!(result, Err(Error::ChunkGarbage)));
    }

    #[test]
    fn test_bad_chunk_line() {
        assert!(matches!(decode_chunked_body(b"zz\r\n"), Err(Error::BadChunkLine(_))));
        assert!(matches!(decode_chunked_body(b"5;ext=1\r\nHello\r\n0\r\n\r\n"), Err(Error::BadChunkLine(_))));
    }

    #[test]
    fn test_truncated_chunk_data() {
        assert!(matches!(decode_chunked_body(b"10\r\nshort"), Err(Error::Read(_))));
    }

    #[test]
    fn test_missing_terminator() {
        assert!(matches!(decode_chunked_body(b"2\r\nok\r\n"), Err(Error::UnexpectedEof)));
        assert!(matches!(decode_chunked_body(b"0\r\n"), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_parse_chunk_size() {
        assert_eq!(parse_chunk_size("0").unwrap(), 0);
        assert_eq!(parse_chunk_size("1f").unwrap(), 31);
        assert_eq!(parse_chunk_size("FF  ").unwrap(), 255);
        assert!(matches!(parse_chunk_size(""), Err(Error::BadChunkLine(_))));
        assert!(matches!(parse_chunk_size("   "), Err(Error::BadChunkLine(_))));
        assert!(matches!(parse_chunk_size("5 x"), Err(Error::BadChunkLine(_))));
        assert!(matches!(parse_chunk_size("12345678901234567"), Err(Error::BadChunkLine(_))));
    }

    #[test]
    fn test_parse_chunk_size_leading_whitespace() {
        assert_eq!(parse_chunk_size(" 5").unwrap(), 5);
        assert_eq!(parse_chunk_size("\t1a ").unwrap(), 26);
    }

    #[test]
    fn test_decode_indented_size_line() {
        assert_eq!(decode_chunked_body(b"  3\r\nabc\r\n 0\r\n\r\n").unwrap(), b"abc");
    }

    #[test]
    fn test_encode_chunked_body_splits_input() {
        let encoded = encode_chunked_body(b"abcdefg", 3).unwrap();
        assert_eq!(encoded, b"3\r\nabc\r\n3\r\ndef\r\n1\r\ng\r\n0\r\n\r\n");
    }

    #[test]
    fn test_encode_multiple_chunks() {
        let mut encoder = ChunkedEncoder::new(Vec::new());
        encoder.write_chunk(b"Hello").unwrap();
        encoder.write_chunk(b"").unwrap();
        encoder.write_chunk(b"World").unwrap();
        encoder.finish().unwrap();

        assert_eq!(encoder.into_inner(), b"5\r\nHello\r\n5\r\nWorld\r\n0\r\n\r\n");
    }
}
