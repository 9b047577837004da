//! Example: Powering a port and driving its LEDs
//!
//! Run with: cargo run --example port_power -- <tcp-port> [port-index]
//!
//! This example demonstrates:
//! - Session configuration with timeouts
//! - Port power on/off with acknowledgement
//! - LED control (no response is read)
//! - Telling device errors apart from transport errors

use iol_hat::{IolError, Led, Session, SessionConfig};
use std::time::Duration;

fn main() -> iol_hat::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut cli = std::env::args().skip(1);
    let tcp_port: u16 = cli.next().and_then(|p| p.parse().ok()).unwrap_or(12010);
    let index: u8 = cli.next().and_then(|p| p.parse().ok()).unwrap_or(0);

    // =========================================================================
    // Connect to the master application
    // =========================================================================

    let config = SessionConfig::new(tcp_port)
        .with_connect_timeout(Duration::from_secs(2))
        .with_read_timeout(Duration::from_secs(2));
    let mut session = Session::with_config(config)?;
    session.connect()?;

    // =========================================================================
    // Power on and light the green LED
    // =========================================================================

    println!("=== Port {} ===\n", index);

    match session.port_power_on(index) {
        Ok(payload) => println!("Power on acknowledged: {:02X?}", payload),
        Err(e) if e.is_device_error() => println!("Device rejected power on: {}", e),
        Err(e) => return Err(e),
    }

    session.set_led(index, Led::Green, true)?;
    println!("Green LED on");

    std::thread::sleep(Duration::from_secs(1));

    // =========================================================================
    // Switch everything off again
    // =========================================================================

    session.set_led(index, Led::Green, false)?;
    println!("LEDs off");

    if let Err(e) = session.port_power_off(index) {
        if let IolError::Protocol { code, description } = &e {
            println!("Power off failed with 0x{:02X}: {}", code, description);
        } else {
            return Err(e);
        }
    } else {
        println!("Power off acknowledged");
    }

    session.close();
    println!("\nDone");
    Ok(())
}
