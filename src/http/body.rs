//! Fixed-length body copy

use super::{Error, Result, TRANSFER_BUFFER_SIZE};
use std::io::{Read, Write};

/// Copy exactly `len` bytes from `reader` to `writer`
///
/// The stream ending early is a read error.
pub fn copy_bytes<R: Read, W: Write>(reader: &mut R, writer: &mut W, len: u64) -> Result<u64> {
    let mut buffer = [0u8; TRANSFER_BUFFER_SIZE];
    let mut offset = 0u64;

    while offset < len {
        let size = (len - offset).min(buffer.len() as u64) as usize;
        reader
            .read_exact(&mut buffer[..size])
            .map_err(Error::read)?;
        writer.write_all(&buffer[..size]).map_err(Error::write)?;
        offset += size as u64;
    }

    Ok(offset)
}
