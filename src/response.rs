//! Response classification.
//!
//! # Response Structure
//!
//! | Byte | Field | Description |
//! |------|-------|-------------|
//! | 0 | STATUS | 0xFF = error response, anything else = success |
//! | 1 | CODE | Error code for error responses, data otherwise |
//! | 2.. | DATA | Optional extra bytes (success only) |
//!
//! The first two bytes are the header and are enough to classify a
//! response. The codec has no knowledge of per-command payload sizes; a
//! success payload is whatever was received, header included.
//!
//! # Example
//!
//! ```
//! use iol_hat::{classify, Response};
//!
//! let ok = classify(&[0x01, 0x00, 0x2A]).unwrap();
//! assert_eq!(ok, Response::Success { payload: vec![0x01, 0x00, 0x2A] });
//!
//! let err = classify(&[0xFF, 0x04]).unwrap();
//! assert_eq!(err, Response::DeviceError { code: 0x04 });
//! ```

use crate::error::{DeviceErrorCode, IolError, Result};

/// Response header size.
pub const RESPONSE_HEADER_SIZE: usize = 2;

/// Status byte marking an error response.
pub const ERROR_STATUS: u8 = 0xFF;

/// A classified device response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The device accepted the command.
    Success {
        /// Every byte received, header included.
        payload: Vec<u8>,
    },
    /// The device rejected the command.
    DeviceError {
        /// Error code from the second header byte.
        code: u8,
    },
}

impl Response {
    /// Returns whether the response indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the reported response length. Error responses always
    /// report 2, whatever else was buffered.
    pub fn reported_len(&self) -> usize {
        match self {
            Self::Success { payload } => payload.len(),
            Self::DeviceError { .. } => RESPONSE_HEADER_SIZE,
        }
    }

    /// Returns the payload of a success response.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::DeviceError { .. } => None,
        }
    }

    /// Returns the device error code of an error response.
    pub fn error_code(&self) -> Option<DeviceErrorCode> {
        match self {
            Self::Success { .. } => None,
            Self::DeviceError { code } => Some(DeviceErrorCode::from_code(*code)),
        }
    }

    /// Converts the response into its payload, or an error if the device
    /// rejected the command.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Protocol` for an error response.
    ///
    /// # Example
    ///
    /// ```
    /// use iol_hat::{classify, IolError};
    ///
    /// let response = classify(&[0xFF, 0x03]).unwrap();
    /// let err = response.into_result().unwrap_err();
    /// assert!(matches!(err, IolError::Protocol { code: 0x03, .. }));
    /// ```
    pub fn into_result(self) -> Result<Vec<u8>> {
        match self {
            Self::Success { payload } => Ok(payload),
            Self::DeviceError { code } => Err(IolError::protocol(code)),
        }
    }
}

/// Classifies received bytes into a [`Response`].
///
/// # Errors
///
/// Returns `IolError::Receive` if fewer than 2 bytes were received.
pub fn classify(received: &[u8]) -> Result<Response> {
    if received.len() < RESPONSE_HEADER_SIZE {
        return Err(IolError::receive(format!(
            "response too short: expected at least {} bytes, got {}",
            RESPONSE_HEADER_SIZE,
            received.len()
        )));
    }

    if received[0] == ERROR_STATUS {
        Ok(Response::DeviceError { code: received[1] })
    } else {
        Ok(Response::Success {
            payload: received.to_vec(),
        })
    }
}

/// A classified response together with the bytes it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The classified response.
    pub response: Response,
    /// Raw bytes received, for diagnostics.
    pub raw: Vec<u8>,
}

impl Reply {
    /// Converts the reply into its payload, or an error if the device
    /// rejected the command.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Protocol` for an error response.
    pub fn into_result(self) -> Result<Vec<u8>> {
        self.response.into_result()
    }
}
