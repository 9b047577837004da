//! # IO-Link HAT Client Library
//!
//! A Rust client for the TCP protocol spoken by the IO-Link HAT master
//! application.
//!
//! This is a **protocol-only** library. Each call maps to one frame sent or
//! one response read. No automatic retries, caching or reconnection.
//!
//! ## Features
//!
//! - **Bit-exact framing**: command frames are built exactly as the firmware
//!   expects them
//! - **Explicit reads**: one blocking header read, then one non-blocking
//!   read for whatever else is buffered
//! - **Typed errors**: transport failures and device errors in one
//!   [`IolError`] enum
//! - **No panics**: all errors returned as `Result<T, IolError>`
//!
//! ## Quick Start
//!
//! ```no_run
//! use iol_hat::{Led, Session};
//!
//! fn main() -> iol_hat::Result<()> {
//!     let mut session = Session::init(12010)?;
//!     session.connect()?;
//!
//!     // Power port 0 on and light its green LED
//!     session.port_power_on(0)?;
//!     session.set_led(0, Led::Green, true)?;
//!
//!     session.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Wire Format
//!
//! Request frame:
//!
//! | Byte | Field | Description |
//! |------|-------|-------------|
//! | 0 | CMD | Command identifier |
//! | 1 | PORT | Port index (first argument byte) |
//! | 2 | LEN | Declared payload length |
//! | 3.. | DATA | `LEN` bytes: argument bytes from index 2 onwards, zero-filled |
//!
//! A request is always `3 + LEN` bytes long.
//!
//! Response frame:
//!
//! | Byte | Field | Description |
//! |------|-------|-------------|
//! | 0 | STATUS | 0xFF = error, anything else = success |
//! | 1 | CODE | Error code (error responses) |
//! | 2.. | DATA | Optional extra bytes |
//!
//! ## Raw Commands
//!
//! ```no_run
//! use iol_hat::{Session, SessionConfig, Response};
//! use std::time::Duration;
//!
//! let config = SessionConfig::new(12010).with_read_timeout(Duration::from_secs(2));
//! let mut session = Session::with_config(config)?;
//! session.connect()?;
//!
//! session.send(0x01, &[0, 2, 0x01], 2)?;
//! match session.receive_response()?.response {
//!     Response::Success { payload } => println!("ok: {:02X?}", payload),
//!     Response::DeviceError { code } => println!("device error 0x{:02X}", code),
//! }
//! # Ok::<(), iol_hat::IolError>(())
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use iol_hat::{IolError, Session};
//!
//! let mut session = Session::init(12010)?;
//! session.connect()?;
//!
//! match session.port_power_on(1) {
//!     Ok(_) => println!("powered"),
//!     Err(IolError::Protocol { code, description }) => {
//!         println!("device refused: 0x{:02X} ({})", code, description);
//!     }
//!     Err(e) => println!("transport error: {}", e),
//! }
//! # Ok::<(), IolError>(())
//! ```
//!
//! ## Logging
//!
//! The library logs through [`tracing`]: frame dumps at `debug`, device
//! errors and I/O failures at `warn`, connection lifecycle at `info`. It
//! never installs a subscriber itself.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod error;
mod frame;
mod port;
mod response;
mod session;
mod transport;
pub mod utils;

// Public re-exports
pub use error::{describe_error, DeviceErrorCode, IolError, Result};
pub use frame::{
    encode, Command, BUFFER_SIZE, CMD_LED, CMD_PORT_POWER, FRAME_HEADER_SIZE, MAX_FRAME_SIZE,
};
pub use port::{led_command, port_power_command, Led, PORT_COMMAND_LEN, POWER_OFF, POWER_ON};
pub use response::{classify, Reply, Response, ERROR_STATUS, RESPONSE_HEADER_SIZE};
pub use session::{Session, SessionConfig, DEFAULT_HOST};
pub use transport::TcpTransport;
