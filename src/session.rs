//! Session lifecycle and the command/response cycle.
//!
//! A [`Session`] owns at most one TCP connection to the HAT master
//! application and moves through three states:
//!
//! | State | Endpoint | Stream | `is_connected()` |
//! |-------|----------|--------|------------------|
//! | closed | none | none | false |
//! | initialized | resolved | none | false |
//! | connected | resolved | open | true |
//!
//! [`Session::init`] resolves the endpoint, [`Session::connect`] opens the
//! stream and [`Session::close`] drops both. Every call is synchronous.
//! Callers send one command and read its response before sending the next.
//!
//! # Example
//!
//! ```no_run
//! use iol_hat::{Command, Session, CMD_PORT_POWER};
//!
//! let mut session = Session::init(12010)?;
//! session.connect()?;
//!
//! session.send_command(&Command::new(CMD_PORT_POWER, &[0, 2, 0x01], 2))?;
//! let reply = session.receive_response()?;
//! println!("{:?}", reply.response);
//!
//! session.close();
//! # Ok::<(), iol_hat::IolError>(())
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::error::{IolError, Result};
use crate::frame::{Command, BUFFER_SIZE};
use crate::response::{classify, Reply, ERROR_STATUS, RESPONSE_HEADER_SIZE};
use crate::transport::TcpTransport;
use crate::utils::format_frame;

/// Host the HAT master application listens on.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Configuration for creating a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Host name or IP address of the master application.
    pub host: String,
    /// TCP port of the master application.
    pub port: u16,
    /// Connect timeout (`None` = OS default).
    pub connect_timeout: Option<Duration>,
    /// Read timeout for the response header (`None` = block indefinitely).
    pub read_timeout: Option<Duration>,
    /// Write timeout (`None` = block indefinitely).
    pub write_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Creates a configuration for the default host and the given port.
    ///
    /// # Example
    ///
    /// ```
    /// use iol_hat::SessionConfig;
    ///
    /// let config = SessionConfig::new(12010);
    /// assert_eq!(config.host, "127.0.0.1");
    /// assert_eq!(config.read_timeout, None);
    /// ```
    pub fn new(port: u16) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port,
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
        }
    }

    /// Sets a custom host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets a connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Bounds the blocking header read. Without it a silent peer blocks
    /// the caller forever.
    ///
    /// # Example
    ///
    /// ```
    /// use iol_hat::SessionConfig;
    /// use std::time::Duration;
    ///
    /// let config = SessionConfig::new(12010).with_read_timeout(Duration::from_secs(2));
    /// assert_eq!(config.read_timeout, Some(Duration::from_secs(2)));
    /// ```
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Sets a write timeout.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }
}

/// A single connection to the HAT master application.
///
/// No automatic retries or reconnection. A device error leaves the
/// connection usable; after a transport error the caller decides whether
/// to [`close`](Session::close) and start over.
pub struct Session {
    config: SessionConfig,
    endpoint: Option<SocketAddr>,
    transport: Option<TcpTransport>,
}

impl Session {
    /// Creates a session for the default host and the given port.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Socket` if the address cannot be resolved.
    pub fn init(port: u16) -> Result<Self> {
        Self::with_config(SessionConfig::new(port))
    }

    /// Creates a session from a configuration. Resolves the address but
    /// does not connect.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Socket` if the address cannot be resolved.
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        let endpoint = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| IolError::socket(format!("invalid address {}: {}", config.host, e)))?
            .next()
            .ok_or_else(|| IolError::socket(format!("no address found for {}", config.host)))?;

        tracing::info!(%endpoint, "IOL client initialized for port {}", config.port);
        Ok(Self {
            config,
            endpoint: Some(endpoint),
            transport: None,
        })
    }

    /// Connects to the master application. Does nothing if already
    /// connected.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Socket` if the session was closed, or
    /// `IolError::Connect` if the handshake fails.
    pub fn connect(&mut self) -> Result<()> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| IolError::socket("client not initialized"))?;

        if self.transport.is_some() {
            tracing::debug!(%endpoint, "already connected");
            return Ok(());
        }

        let transport = TcpTransport::connect(endpoint, self.config.connect_timeout)
            .inspect_err(|e| tracing::warn!(%endpoint, "{}", e))?;
        transport.set_timeouts(self.config.read_timeout, self.config.write_timeout)?;

        tracing::info!(%endpoint, "connected to IOL HAT master application");
        self.transport = Some(transport);
        Ok(())
    }

    /// Returns whether the session holds an open connection.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Returns the resolved endpoint, if the session has not been closed.
    pub fn endpoint(&self) -> Option<SocketAddr> {
        self.endpoint
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Encodes and sends a command.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Connect` if not connected (nothing is written),
    /// or `IolError::Send` if the frame is too large or the write fails or
    /// is partial.
    pub fn send_command(&mut self, command: &Command) -> Result<()> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| IolError::connect("client not connected"))?;

        let frame = command.to_bytes()?;
        transport
            .send(&frame)
            .inspect_err(|e| tracing::warn!("{}", e))?;

        tracing::debug!(
            port = command.port(),
            "sent command 0x{:02X} ({} bytes): {}",
            command.id(),
            frame.len(),
            format_frame(&frame)
        );
        Ok(())
    }

    /// Sends a command given as raw parts.
    ///
    /// # Errors
    ///
    /// Same as [`send_command`](Session::send_command).
    pub fn send(&mut self, command_id: u8, args: &[u8], declared_len: u8) -> Result<()> {
        self.send_command(&Command::new(command_id, args, declared_len))
    }

    /// Reads and classifies one response.
    ///
    /// Performs one blocking read for the 2-byte header. Unless the header
    /// is an error response, follows it with one non-blocking read that
    /// picks up whatever is already buffered. Payload bytes that arrive
    /// later stay in the stream.
    ///
    /// A device error is returned as `Ok` with
    /// [`Response::DeviceError`](crate::Response::DeviceError); use
    /// [`Reply::into_result`] to turn it into an error.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Connect` if not connected, or `IolError::Receive`
    /// if the header cannot be read in full.
    pub fn receive_response(&mut self) -> Result<Reply> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| IolError::connect("client not connected"))?;

        let header = transport
            .read_header()
            .inspect_err(|e| tracing::warn!("{}", e))?;

        let mut raw = Vec::with_capacity(BUFFER_SIZE);
        raw.extend_from_slice(&header);

        if header[0] == ERROR_STATUS {
            tracing::warn!(
                "error response received: error code 0x{:02X} ({})",
                header[1],
                crate::error::describe_error(header[1])
            );
        } else {
            let mut extra = [0u8; BUFFER_SIZE - RESPONSE_HEADER_SIZE];
            let n = transport.read_available(&mut extra)?;
            raw.extend_from_slice(&extra[..n]);
            tracing::debug!("received RSP ({} bytes): {}", raw.len(), format_frame(&raw));
        }

        let response = classify(&raw)?;
        Ok(Reply { response, raw })
    }

    /// Closes the connection and releases the endpoint. Safe to call more
    /// than once.
    pub fn close(&mut self) {
        self.transport = None;
        self.endpoint = None;
        tracing::info!("IOL client connection closed");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("transport", &self.transport)
            .field("connected", &self.is_connected())
            .finish()
    }
}
