//! Output sink for the response body

use super::{Error, Result};
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

/// Where the response body goes
pub enum OutputSink {
    File(BufWriter<File>),
    Stdout(Stdout),
}

impl OutputSink {
    /// Create or truncate `path`, or fall back to standard output
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let file = File::create(path).map_err(|e| Error::Create {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                Ok(OutputSink::File(BufWriter::new(file)))
            }
            None => Ok(OutputSink::Stdout(io::stdout())),
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::File(w) => w.write(buf),
            OutputSink::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::File(w) => w.flush(),
            OutputSink::Stdout(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_file_sink_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        fs::write(&path, b"old contents that are longer").unwrap();

        let mut sink = OutputSink::open(Some(path.as_path())).unwrap();
        sink.write_all(b"new").unwrap();
        sink.flush().unwrap();
        drop(sink);

        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.bin");
        assert!(matches!(OutputSink::open(Some(path.as_path())), Err(Error::Create { .. })));
    }

    #[test]
    fn test_stdout_sink() {
        assert!(matches!(OutputSink::open(None), Ok(OutputSink::Stdout(_))));
    }
}
