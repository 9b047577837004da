//! Command frame construction and serialization.
//!
//! # Frame Structure
//!
//! | Byte | Field | Description |
//! |------|-------|-------------|
//! | 0 | CMD | Command identifier |
//! | 1 | PORT | First argument byte (port index for every command) |
//! | 2 | LEN | Declared payload length, supplied by the caller |
//! | 3.. | DATA | `LEN` bytes: argument bytes from index 2 onwards, zero-filled |
//!
//! A frame is always `3 + LEN` bytes long. `LEN` counts the bytes after
//! the length byte and is taken as given, not recomputed from the argument
//! buffer. At most `LEN - 1` argument bytes are copied from `args[2..]`;
//! the remaining data bytes are zero. The second argument byte is never
//! transmitted.
//!
//! # Example
//!
//! ```
//! use iol_hat::{Command, CMD_PORT_POWER};
//!
//! let cmd = Command::new(CMD_PORT_POWER, &[1, 2, 0x01], 2);
//! assert_eq!(cmd.to_bytes().unwrap(), vec![CMD_PORT_POWER, 1, 2, 0x01, 0x00]);
//! ```

use crate::error::{IolError, Result};

/// Port power command identifier.
pub const CMD_PORT_POWER: u8 = 0x01;
/// LED control command identifier.
pub const CMD_LED: u8 = 0x02;

/// Frame header size: command, port and length bytes.
pub const FRAME_HEADER_SIZE: usize = 3;

/// Payload buffer size shared by requests and responses.
pub const BUFFER_SIZE: usize = 256;

/// Largest frame the client will send.
pub const MAX_FRAME_SIZE: usize = FRAME_HEADER_SIZE + BUFFER_SIZE;

/// A command addressed to one port of the HAT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    id: u8,
    args: Vec<u8>,
    declared_len: u8,
}

impl Command {
    /// Creates a new command.
    ///
    /// # Arguments
    ///
    /// * `id` - Command identifier
    /// * `args` - Argument bytes; `args[0]` is the port index
    /// * `declared_len` - Value written to the frame's length byte
    pub fn new(id: u8, args: &[u8], declared_len: u8) -> Self {
        Self {
            id,
            args: args.to_vec(),
            declared_len,
        }
    }

    /// Returns the command identifier.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Returns the port index (first argument byte, 0 if there are none).
    pub fn port(&self) -> u8 {
        self.args.first().copied().unwrap_or(0)
    }

    /// Returns the declared payload length.
    pub fn declared_len(&self) -> u8 {
        self.declared_len
    }

    /// Returns the raw argument bytes.
    pub fn args(&self) -> &[u8] {
        &self.args
    }

    /// Returns the size of the encoded frame: header plus declared length.
    pub fn encoded_len(&self) -> usize {
        FRAME_HEADER_SIZE + usize::from(self.declared_len)
    }

    /// Serializes the command to bytes for transmission.
    ///
    /// # Errors
    ///
    /// Returns `IolError::Send` if the argument buffer exceeds
    /// [`BUFFER_SIZE`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self.id, &self.args, self.declared_len)
    }
}

/// Encodes a command frame of `3 + declared_len` bytes.
///
/// # Errors
///
/// Returns `IolError::Send` if the argument buffer exceeds [`BUFFER_SIZE`]
/// or the frame would exceed [`MAX_FRAME_SIZE`].
///
/// # Example
///
/// ```
/// use iol_hat::encode;
///
/// // args[1] (0xEE) is skipped on the wire, the last data byte is zero
/// let frame = encode(0x02, &[0x00, 0xEE, 0x03], 2).unwrap();
/// assert_eq!(frame, vec![0x02, 0x00, 0x02, 0x03, 0x00]);
/// ```
pub fn encode(command_id: u8, args: &[u8], declared_len: u8) -> Result<Vec<u8>> {
    if args.len() > BUFFER_SIZE {
        return Err(IolError::send(format!(
            "argument buffer too large: {} bytes exceeds capacity of {}",
            args.len(),
            BUFFER_SIZE
        )));
    }

    let data_len = usize::from(declared_len);
    let total = FRAME_HEADER_SIZE + data_len;
    if total > MAX_FRAME_SIZE {
        return Err(IolError::send(format!(
            "frame too large: {} bytes exceeds capacity of {}",
            total, MAX_FRAME_SIZE
        )));
    }

    let tail = args.get(2..).unwrap_or(&[]);
    let copied = data_len.saturating_sub(1).min(tail.len());

    let mut bytes = Vec::with_capacity(total);
    bytes.push(command_id);
    bytes.push(args.first().copied().unwrap_or(0));
    bytes.push(declared_len);
    bytes.extend_from_slice(&tail[..copied]);
    bytes.resize(total, 0x00);
    Ok(bytes)
}
