//! Transport sessions
//!
//! `SessionOps` is the seam between the HTTP code and the socket. The
//! client only talks to `HttpSession`, which waits for readiness before each
//! read or write when a deadline is configured and otherwise blocks.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::os::fd::AsRawFd;
use std::time::Duration;

/// Byte transport under an HTTP exchange
pub trait SessionOps {
    /// Wait up to `timeout` for `events`; `None` waits forever.
    ///
    /// Returns false if the wait expired.
    fn poll(&self, events: PollEvents, timeout: Option<Duration>) -> io::Result<bool>;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Shut the transport down in both directions
    fn close(&mut self) -> io::Result<()>;
}

/// Readiness to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEvents {
    Read,
    Write,
}

/// A transport with an optional per-operation deadline
pub struct HttpSession<S: SessionOps> {
    session: S,
    timeout: Option<Duration>,
}

impl<S: SessionOps> HttpSession<S> {
    /// Wrap `session` with no deadline
    pub fn new(session: S) -> Self {
        HttpSession {
            session,
            timeout: None,
        }
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn close(&mut self) -> io::Result<()> {
        self.session.close()
    }

    fn wait(&self, events: PollEvents) -> io::Result<()> {
        if self.timeout.is_none() {
            return Ok(());
        }
        if !self.session.poll(events, self.timeout)? {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "operation timed out"));
        }
        Ok(())
    }
}

impl<S: SessionOps> Read for HttpSession<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.wait(PollEvents::Read)?;
        self.session.read(buf)
    }
}

impl<S: SessionOps> Write for HttpSession<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.wait(PollEvents::Write)?;
        self.session.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Plain TCP transport, readiness via `poll(2)`
pub struct FdSessionOps {
    stream: TcpStream,
}

impl FdSessionOps {
    pub fn new(stream: TcpStream) -> Self {
        FdSessionOps { stream }
    }
}

impl SessionOps for FdSessionOps {
    fn poll(&self, events: PollEvents, timeout: Option<Duration>) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.stream.as_raw_fd(),
            events: match events {
                PollEvents::Read => libc::POLLIN,
                PollEvents::Write => libc::POLLOUT,
            },
            revents: 0,
        };
        let timeout_ms = match timeout {
            Some(d) => d.as_millis().min(i32::MAX as u128) as i32,
            None => -1,
        };

        loop {
            let ready = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if ready >= 0 {
                return Ok(ready > 0);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            // The peer may already have closed its end
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn test_poll_reports_pending_data() {
        let (client, mut server) = pair();
        let ops = FdSessionOps::new(client);

        let wait = Some(Duration::from_millis(50));
        assert!(!ops.poll(PollEvents::Read, wait).unwrap());
        assert!(ops.poll(PollEvents::Write, wait).unwrap());

        server.write_all(b"ping").unwrap();
        assert!(ops.poll(PollEvents::Read, Some(Duration::from_secs(1))).unwrap());
    }

    #[test]
    fn test_read_deadline_expires() {
        let (client, _server) = pair();
        let mut session = HttpSession::new(FdSessionOps::new(client));
        session.set_timeout(Some(Duration::from_millis(100)));

        let mut buf = [0u8; 10];
        let err = session.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_blocks_without_deadline() {
        let (client, mut server) = pair();
        let mut session = HttpSession::new(FdSessionOps::new(client));
        assert_eq!(session.timeout(), None);

        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            server.write_all(b"late").unwrap();
        });

        let mut buf = [0u8; 4];
        session.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"late");

        writer.join().unwrap();
    }

    #[test]
    fn test_close_signals_eof_to_peer() {
        let (client, mut server) = pair();
        let mut session = HttpSession::new(FdSessionOps::new(client));
        session.write_all(b"bye").unwrap();
        session.close().unwrap();

        let mut received = Vec::new();
        server.read_to_end(&mut received).unwrap();
        assert_eq!(received, b"bye");
    }
}
