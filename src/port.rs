//! Port power and LED control.
//!
//! Every port operation sends the argument list `[port, 2, value]` with a
//! declared length of 2, so the frame on the wire is the five bytes
//! `[command, port, 0x02, value, 0x00]`.
//!
//! | Operation | Command | Value | Response read |
//! |-----------|---------|-------|:-------------:|
//! | Power on | [`CMD_PORT_POWER`] | 0x01 | ✓ |
//! | Power off | [`CMD_PORT_POWER`] | 0x00 | ✓ |
//! | LED on | [`CMD_LED`] | [`Led::mask`] | ✗ |
//! | LED off | [`CMD_LED`] | 0x00 | ✗ |
//!
//! The firmware does not acknowledge LED commands, so no response is read
//! for them.
//!
//! Port indices are passed through unchecked. The device answers an
//! out-of-range index with error 0x04.
//!
//! # Example
//!
//! ```no_run
//! use iol_hat::{Led, Session};
//!
//! let mut session = Session::init(12010)?;
//! session.connect()?;
//!
//! session.port_power_on(0)?;
//! session.set_led(0, Led::Green, true)?;
//! # Ok::<(), iol_hat::IolError>(())
//! ```

use crate::error::Result;
use crate::frame::{Command, CMD_LED, CMD_PORT_POWER};
use crate::session::Session;

/// Declared payload length of every port operation.
pub const PORT_COMMAND_LEN: u8 = 2;

/// Port power value for "on".
pub const POWER_ON: u8 = 0x01;
/// Port power value for "off".
pub const POWER_OFF: u8 = 0x00;

/// Port status LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Led {
    /// Green LED.
    Green,
    /// Red LED.
    Red,
    /// Green and red LEDs together.
    Both,
}

impl Led {
    /// Returns the LED mask sent when switching this LED on.
    pub fn mask(self) -> u8 {
        match self {
            Led::Green => 0x01,
            Led::Red => 0x02,
            Led::Both => 0x03,
        }
    }
}

impl std::fmt::Display for Led {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Led::Green => "green",
            Led::Red => "red",
            Led::Both => "both",
        };
        write!(f, "{}", name)
    }
}

fn port_command(id: u8, port: u8, value: u8) -> Command {
    Command::new(id, &[port, PORT_COMMAND_LEN, value], PORT_COMMAND_LEN)
}

/// Builds a port power command.
///
/// # Example
///
/// ```
/// use iol_hat::{port_power_command, CMD_PORT_POWER};
///
/// let bytes = port_power_command(1, true).to_bytes().unwrap();
/// assert_eq!(bytes, vec![CMD_PORT_POWER, 1, 0x02, 0x01, 0x00]);
/// ```
pub fn port_power_command(port: u8, on: bool) -> Command {
    port_command(CMD_PORT_POWER, port, if on { POWER_ON } else { POWER_OFF })
}

/// Builds an LED command. Switching off always sends 0x00, whichever LED
/// is named.
pub fn led_command(port: u8, led: Led, on: bool) -> Command {
    port_command(CMD_LED, port, if on { led.mask() } else { 0x00 })
}

impl Session {
    /// Powers a port on and waits for the acknowledgement.
    ///
    /// Returns the response payload.
    ///
    /// # Errors
    ///
    /// Returns a transport error, or `IolError::Protocol` if the device
    /// rejects the command.
    pub fn port_power_on(&mut self, port: u8) -> Result<Vec<u8>> {
        self.port_power(port, true)
    }

    /// Powers a port off and waits for the acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns a transport error, or `IolError::Protocol` if the device
    /// rejects the command.
    pub fn port_power_off(&mut self, port: u8) -> Result<Vec<u8>> {
        self.port_power(port, false)
    }

    fn port_power(&mut self, port: u8, on: bool) -> Result<Vec<u8>> {
        self.send_command(&port_power_command(port, on))?;
        let payload = self.receive_response()?.into_result()?;

        tracing::info!(
            port,
            "port {} powered {} successfully",
            port,
            if on { "on" } else { "off" }
        );
        Ok(payload)
    }

    /// Switches a port LED on or off. Does not read a response.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the command cannot be sent.
    pub fn set_led(&mut self, port: u8, led: Led, on: bool) -> Result<()> {
        self.send_command(&led_command(port, led, on))?;
        tracing::debug!(port, %led, on, "LED command sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IolError;
    use crate::session::SessionConfig;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_port_power_frames() {
        assert_eq!(
            port_power_command(0, true).to_bytes().unwrap(),
            vec![CMD_PORT_POWER, 0, 2, 0x01, 0x00]
        );
        assert_eq!(
            port_power_command(1, false).to_bytes().unwrap(),
            vec![CMD_PORT_POWER, 1, 2, 0x00, 0x00]
        );
    }

    #[test]
    fn test_led_frames() {
        assert_eq!(
            led_command(0, Led::Green, true).to_bytes().unwrap(),
            vec![CMD_LED, 0, 2, 0x01, 0x00]
        );
        assert_eq!(
            led_command(1, Led::Red, true).to_bytes().unwrap(),
            vec![CMD_LED, 1, 2, 0x02, 0x00]
        );
        assert_eq!(
            led_command(0, Led::Both, true).to_bytes().unwrap(),
            vec![CMD_LED, 0, 2, 0x03, 0x00]
        );
        for led in [Led::Green, Led::Red, Led::Both] {
            assert_eq!(
                led_command(1, led, false).to_bytes().unwrap(),
                vec![CMD_LED, 1, 2, 0x00, 0x00]
            );
        }
    }

    #[test]
    fn test_led_display() {
        assert_eq!(Led::Green.to_string(), "green");
        assert_eq!(Led::Red.to_string(), "red");
        assert_eq!(Led::Both.to_string(), "both");
    }

    #[test]
    fn test_power_on_and_led_over_session() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let peer = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut power = [0u8; 5];
            stream.read_exact(&mut power).unwrap();
            stream.write_all(&[CMD_PORT_POWER, 0x00]).unwrap();
            let mut led = [0u8; 5];
            stream.read_exact(&mut led).unwrap();
            (power, led)
        });

        let mut session = Session::with_config(SessionConfig::new(port)).unwrap();
        session.connect().unwrap();
        let payload = session.port_power_on(1).unwrap();
        assert_eq!(payload, vec![CMD_PORT_POWER, 0x00]);
        session.set_led(1, Led::Red, true).unwrap();

        let (power, led) = peer.join().unwrap();
        assert_eq!(power, [CMD_PORT_POWER, 1, 2, POWER_ON, 0x00]);
        assert_eq!(led, [CMD_LED, 1, 2, 0x02, 0x00]);
    }

    #[test]
    fn test_power_off_device_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let peer = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 5];
            stream.read_exact(&mut request).unwrap();
            stream.write_all(&[0xFF, 0x04]).unwrap();
            request
        });

        let mut session = Session::with_config(SessionConfig::new(port)).unwrap();
        session.connect().unwrap();
        let err = session.port_power_off(5).unwrap_err();
        assert!(matches!(err, IolError::Protocol { code: 0x04, .. }));
        assert!(session.is_connected());

        assert_eq!(peer.join().unwrap(), [CMD_PORT_POWER, 5, 2, POWER_OFF, 0x00]);
    }

    #[test]
    fn test_port_operations_need_connection() {
        let mut session = Session::init(12010).unwrap();
        assert!(matches!(
            session.port_power_on(0).unwrap_err(),
            IolError::Connect { .. }
        ));
        assert!(matches!(
            session.set_led(0, Led::Green, true).unwrap_err(),
            IolError::Connect { .. }
        ));
    }
}
