//! Error types for the IO-Link HAT protocol.
//!
//! Transport failures and device errors share one enum, [`IolError`].
//! A device error ([`IolError::Protocol`]) means the firmware rejected a
//! command; the connection stays usable. The other variants come from the
//! socket layer and leave the decision to reconnect with the caller.

use thiserror::Error;

/// Result type alias for IO-Link HAT operations.
pub type Result<T> = std::result::Result<T, IolError>;

/// Errors that can occur while talking to the IO-Link HAT.
#[derive(Debug, Error)]
pub enum IolError {
    /// Address resolution failed, or the session has no endpoint.
    #[error("Socket error: {reason}")]
    Socket {
        /// Description of the socket error.
        reason: String,
    },

    /// Connection handshake failed, or the session is not connected.
    #[error("Connect error: {reason}")]
    Connect {
        /// Description of the connect error.
        reason: String,
    },

    /// Frame could not be built or written in full.
    #[error("Send error: {reason}")]
    Send {
        /// Description of the send error.
        reason: String,
    },

    /// Response header could not be read.
    #[error("Receive error: {reason}")]
    Receive {
        /// Description of the receive error.
        reason: String,
    },

    /// The device answered with an error response (status byte 0xFF).
    #[error("Device error 0x{code:02X}: {description}")]
    Protocol {
        /// Error code reported by the device.
        code: u8,
        /// Human readable meaning of `code`.
        description: &'static str,
    },
}

impl IolError {
    /// Creates a new `Socket` error.
    pub fn socket(reason: impl Into<String>) -> Self {
        Self::Socket {
            reason: reason.into(),
        }
    }

    /// Creates a new `Connect` error.
    ///
    /// # Example
    ///
    /// ```
    /// use iol_hat::IolError;
    ///
    /// let err = IolError::connect("client not connected");
    /// assert_eq!(err.to_string(), "Connect error: client not connected");
    /// ```
    pub fn connect(reason: impl Into<String>) -> Self {
        Self::Connect {
            reason: reason.into(),
        }
    }

    /// Creates a new `Send` error.
    pub fn send(reason: impl Into<String>) -> Self {
        Self::Send {
            reason: reason.into(),
        }
    }

    /// Creates a new `Receive` error.
    pub fn receive(reason: impl Into<String>) -> Self {
        Self::Receive {
            reason: reason.into(),
        }
    }

    /// Creates a new `Protocol` error from a device error code.
    ///
    /// # Example
    ///
    /// ```
    /// use iol_hat::IolError;
    ///
    /// let err = IolError::protocol(0x04);
    /// assert_eq!(err.to_string(), "Device error 0x04: Port ID error (port ID >1)");
    /// ```
    pub fn protocol(code: u8) -> Self {
        Self::Protocol {
            code,
            description: describe_error(code),
        }
    }

    /// Returns whether this error was reported by the device rather than
    /// by the transport.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}

/// Error codes the IO-Link HAT firmware reports in an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceErrorCode {
    /// 0x01: the message length did not match the command.
    MessageLength,
    /// 0x02: the command identifier is not known to the firmware.
    UnknownFunction,
    /// 0x03: the port could not be powered.
    PortPower,
    /// 0x04: the port index is out of range (greater than 1).
    PortId,
    /// 0x05: internal firmware error.
    Internal,
    /// 0x06: the port is in the wrong state for the command.
    WrongStatus,
    /// Any code not listed above.
    Unknown(u8),
}

impl DeviceErrorCode {
    /// Maps a raw code byte to its variant.
    ///
    /// # Example
    ///
    /// ```
    /// use iol_hat::DeviceErrorCode;
    ///
    /// assert_eq!(DeviceErrorCode::from_code(0x03), DeviceErrorCode::PortPower);
    /// assert_eq!(DeviceErrorCode::from_code(0x42), DeviceErrorCode::Unknown(0x42));
    /// ```
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => Self::MessageLength,
            0x02 => Self::UnknownFunction,
            0x03 => Self::PortPower,
            0x04 => Self::PortId,
            0x05 => Self::Internal,
            0x06 => Self::WrongStatus,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw code byte.
    pub fn code(self) -> u8 {
        match self {
            Self::MessageLength => 0x01,
            Self::UnknownFunction => 0x02,
            Self::PortPower => 0x03,
            Self::PortId => 0x04,
            Self::Internal => 0x05,
            Self::WrongStatus => 0x06,
            Self::Unknown(code) => code,
        }
    }

    /// Returns the description of this code.
    pub fn description(self) -> &'static str {
        match self {
            Self::MessageLength => "Message Length Error",
            Self::UnknownFunction => "Function ID unknown",
            Self::PortPower => "Port power error",
            Self::PortId => "Port ID error (port ID >1)",
            Self::Internal => "Internal error",
            Self::WrongStatus => "Wrong status",
            Self::Unknown(_) => "Unknown error code",
        }
    }
}

impl From<u8> for DeviceErrorCode {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

impl std::fmt::Display for DeviceErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:02X}: {}", self.code(), self.description())
    }
}

/// Returns the description of a device error code.
///
/// Diagnostics only: every error response is a [`IolError::Protocol`]
/// whatever its code.
///
/// # Example
///
/// ```
/// use iol_hat::describe_error;
///
/// assert_eq!(describe_error(0x01), "Message Length Error");
/// assert_eq!(describe_error(0x07), "Unknown error code");
/// ```
pub fn describe_error(code: u8) -> &'static str {
    DeviceErrorCode::from_code(code).description()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(describe_error(0x01), "Message Length Error");
        assert_eq!(describe_error(0x02), "Function ID unknown");
        assert_eq!(describe_error(0x03), "Port power error");
        assert_eq!(describe_error(0x04), "Port ID error (port ID >1)");
        assert_eq!(describe_error(0x05), "Internal error");
        assert_eq!(describe_error(0x06), "Wrong status");
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(describe_error(0x00), "Unknown error code");
        assert_eq!(describe_error(0x07), "Unknown error code");
        assert_eq!(describe_error(0xFF), "Unknown error code");
    }

    #[test]
    fn test_code_roundtrip() {
        for code in 0..=u8::MAX {
            assert_eq!(DeviceErrorCode::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_protocol_display() {
        let err = IolError::protocol(0x07);
        assert_eq!(err.to_string(), "Device error 0x07: Unknown error code");
        assert!(err.is_device_error());
    }

    #[test]
    fn test_transport_errors_are_not_device_errors() {
        assert!(!IolError::socket("bad address").is_device_error());
        assert!(!IolError::connect("refused").is_device_error());
        assert!(!IolError::send("short write").is_device_error());
        assert!(!IolError::receive("eof").is_device_error());
    }

    #[test]
    fn test_device_error_code_display() {
        assert_eq!(
            DeviceErrorCode::WrongStatus.to_string(),
            "0x06: Wrong status"
        );
    }
}
