//! TCP transport layer for the IO-Link HAT.
//!
//! [`TcpTransport`] only moves bytes. It knows nothing about frames beyond
//! the size of the response header it reads first.
//!
//! Each operation maps to exactly one socket call:
//!
//! - [`TcpTransport::send`] - one `write`, short writes are errors
//! - [`TcpTransport::read_header`] - one blocking `read` of up to 2 bytes
//! - [`TcpTransport::read_available`] - one non-blocking `read` for whatever is
//!   already buffered
//!
//! Nothing loops or retries; a header split across TCP segments is
//! reported as a receive error.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::{IolError, Result};
use crate::response::RESPONSE_HEADER_SIZE;

/// TCP transport for the IO-Link HAT.
pub struct TcpTransport {
    stream: TcpStream,
    remote_addr: SocketAddr,
}

impl TcpTransport {
    /// Connects to the HAT master application.
    ///
    /// # Arguments
    ///
    /// * `addr` - Socket address of the master application
    /// * `timeout` - Connect timeout; `None` blocks until the OS gives up
    ///
    /// # Errors
    ///
    /// Returns `IolError::Connect` if the handshake fails.
    pub fn connect(addr: SocketAddr, timeout: Option<Duration>) -> Result<Self> {
        let stream = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        }
        .map_err(|e| IolError::connect(format!("connection to {} failed: {}", addr, e)))?;

        Ok(Self {
            stream,
            remote_addr: addr,
        })
    }

    /// Sets read and write timeouts. `None` means block indefinitely.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Connect` if the socket rejects the option.
    pub fn set_timeouts(&self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        self.stream
            .set_read_timeout(read)
            .and_then(|_| self.stream.set_write_timeout(write))
            .map_err(|e| IolError::connect(format!("failed to configure timeouts: {}", e)))
    }

    /// Writes a frame with a single write call.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Send` if the write fails or is partial.
    pub fn send(&mut self, frame: &[u8]) -> Result<()> {
        let sent = self
            .stream
            .write(frame)
            .map_err(|e| IolError::send(format!("write failed: {}", e)))?;

        if sent != frame.len() {
            return Err(IolError::send(format!(
                "partial write: {} of {} bytes sent",
                sent,
                frame.len()
            )));
        }
        Ok(())
    }

    /// Reads the response header with a single blocking read.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Receive` if the read fails, times out or yields
    /// fewer than 2 bytes.
    pub fn read_header(&mut self) -> Result<[u8; RESPONSE_HEADER_SIZE]> {
        let mut header = [0u8; RESPONSE_HEADER_SIZE];
        match self.stream.read(&mut header) {
            Ok(n) if n == RESPONSE_HEADER_SIZE => Ok(header),
            Ok(n) => Err(IolError::receive(format!(
                "failed to receive response header: got {} of {} bytes",
                n, RESPONSE_HEADER_SIZE
            ))),
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Err(IolError::receive("timed out waiting for response header"))
            }
            Err(e) => Err(IolError::receive(format!(
                "failed to receive response header: {}",
                e
            ))),
        }
    }

    /// Reads whatever is already buffered, without blocking.
    ///
    /// Returns the number of bytes placed in `buf`. "Would block", EOF and
    /// read failures all count as zero bytes.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Receive` only if the socket cannot be switched
    /// back to blocking mode.
    pub fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        if let Err(e) = self.stream.set_nonblocking(true) {
            tracing::debug!(error = %e, "could not enter non-blocking mode, skipping follow-up read");
            return Ok(0);
        }

        let read = match self.stream.read(buf) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::WouldBlock => 0,
            Err(e) => {
                tracing::debug!(error = %e, "follow-up read failed");
                0
            }
        };

        self.stream
            .set_nonblocking(false)
            .map_err(|e| IolError::receive(format!("failed to restore blocking mode: {}", e)))?;

        Ok(read)
    }

    /// Returns the remote address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("remote_addr", &self.remote_addr)
            .field("local_addr", &self.stream.local_addr().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn loopback() -> (TcpListener, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        (listener, addr)
    }

    #[test]
    fn test_send_writes_whole_frame() {
        let (listener, addr) = loopback();
        let peer = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4];
            stream.read_exact(&mut buf).unwrap();
            buf
        });

        let mut transport = TcpTransport::connect(addr, None).unwrap();
        transport.send(&[0x01, 0x00, 0x02, 0x01]).unwrap();
        assert_eq!(peer.join().unwrap(), [0x01, 0x00, 0x02, 0x01]);
    }

    #[test]
    fn test_read_header_then_buffered_bytes() {
        let (listener, addr) = loopback();
        let peer = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(&[0x10, 0x20, 0x30, 0x40]).unwrap();
            let mut done = [0u8; 1];
            let _ = stream.read(&mut done);
        });

        let mut transport = TcpTransport::connect(addr, None).unwrap();
        assert_eq!(transport.read_header().unwrap(), [0x10, 0x20]);

        let mut extra = [0u8; 16];
        let n = transport.read_available(&mut extra).unwrap();
        assert_eq!(&extra[..n], &[0x30, 0x40]);

        // Nothing left: the read returns at once with zero bytes.
        assert_eq!(transport.read_available(&mut extra).unwrap(), 0);

        transport.send(&[0x00]).unwrap();
        peer.join().unwrap();
    }

    #[test]
    fn test_read_header_short_read() {
        let (listener, addr) = loopback();
        let peer = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(&[0x01]).unwrap();
        });

        let mut transport = TcpTransport::connect(addr, None).unwrap();
        peer.join().unwrap();
        let err = transport.read_header().unwrap_err();
        assert!(matches!(err, IolError::Receive { .. }));
    }

    #[test]
    fn test_read_header_timeout() {
        let (listener, addr) = loopback();
        let peer = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut done = [0u8; 1];
            let _ = stream.read(&mut done);
        });

        let mut transport = TcpTransport::connect(addr, None).unwrap();
        transport
            .set_timeouts(Some(Duration::from_millis(50)), None)
            .unwrap();
        let err = transport.read_header().unwrap_err();
        assert!(matches!(err, IolError::Receive { .. }));

        drop(transport);
        peer.join().unwrap();
    }

    #[test]
    fn test_connect_refused() {
        let (listener, addr) = loopback();
        drop(listener);
        let err = TcpTransport::connect(addr, Some(Duration::from_secs(1))).unwrap_err();
        assert!(matches!(err, IolError::Connect { .. }));
    }

    #[test]
    fn test_transport_debug() {
        let (listener, addr) = loopback();
        let transport = TcpTransport::connect(addr, None).unwrap();
        let debug_str = format!("{:?}", transport);
        assert!(debug_str.contains("TcpTransport"));
        assert!(debug_str.contains(&addr.to_string()));
        assert_eq!(transport.remote_addr(), addr);
        drop(listener);
    }
}
