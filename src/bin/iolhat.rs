//! IO-Link HAT command-line client
//!
//! Powers ports, drives port LEDs and sends raw commands to the HAT master
//! application.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use iol_hat::utils::{format_byte, format_frame};
use iol_hat::{Led, Response, Session, SessionConfig, DEFAULT_HOST};
use tracing_subscriber::{fmt, EnvFilter};

/// IO-Link HAT client
#[derive(Parser, Debug)]
#[command(name = "iolhat")]
#[command(about = "Control IO-Link HAT ports over the master application TCP interface")]
#[command(version)]
struct Args {
    /// Host of the master application
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// TCP port of the master application
    #[arg(short = 'p', long)]
    tcp_port: u16,

    /// Response timeout in milliseconds (0 = wait forever)
    #[arg(short, long, default_value = "0")]
    timeout_ms: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Power a port on
    PowerOn {
        /// Port index (0 or 1)
        index: u8,
    },

    /// Power a port off
    PowerOff {
        /// Port index (0 or 1)
        index: u8,
    },

    /// Switch a port LED on or off
    Led {
        /// Port index (0 or 1)
        index: u8,

        /// Which LED
        #[arg(value_enum)]
        led: LedArg,

        /// New state
        #[arg(value_enum)]
        state: State,
    },

    /// Send a raw command and print the response
    Raw {
        /// Command identifier (decimal or 0x-prefixed hex)
        #[arg(value_parser = parse_byte_arg)]
        command_id: u8,

        /// Argument bytes as hex; the first byte is the port index
        #[arg(value_parser = parse_hex_arg)]
        args: HexBytes,

        /// Declared payload length
        #[arg(short, long, value_parser = parse_byte_arg)]
        len: u8,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LedArg {
    Green,
    Red,
    Both,
}

impl From<LedArg> for Led {
    fn from(arg: LedArg) -> Self {
        match arg {
            LedArg::Green => Led::Green,
            LedArg::Red => Led::Red,
            LedArg::Both => Led::Both,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum State {
    On,
    Off,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Argument bytes given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
struct HexBytes(Vec<u8>);

/// Parses a byte written in decimal or with a `0x` prefix in hex.
fn parse_byte_arg(text: &str) -> Result<u8, String> {
    let text = text.trim();
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => text.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid byte '{}': {}", text, e))
}

/// Parses a hex string into bytes. Spaces, colons and a leading `0x` are
/// ignored.
fn parse_hex_arg(text: &str) -> Result<HexBytes, String> {
    let text = text.trim();
    let text = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits)
        .map(HexBytes)
        .map_err(|e| format!("invalid hex '{}': {}", text, e))
}

fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: Args) -> iol_hat::Result<()> {
    let mut config = SessionConfig::new(args.tcp_port).with_host(args.host);
    if args.timeout_ms > 0 {
        let timeout = Duration::from_millis(args.timeout_ms);
        config = config
            .with_connect_timeout(timeout)
            .with_read_timeout(timeout)
            .with_write_timeout(timeout);
    }

    let mut session = Session::with_config(config)?;
    session.connect()?;

    let result = match args.command {
        Commands::PowerOn { index } => session.port_power_on(index).map(|_| ()),
        Commands::PowerOff { index } => session.port_power_off(index).map(|_| ()),
        Commands::Led { index, led, state } => {
            session.set_led(index, led.into(), matches!(state, State::On))
        }
        Commands::Raw {
            command_id,
            args,
            len,
        } => raw_command(&mut session, command_id, &args.0, len),
    };

    session.close();
    result
}

fn raw_command(session: &mut Session, command_id: u8, args: &[u8], len: u8) -> iol_hat::Result<()> {
    session.send(command_id, args, len)?;
    let reply = session.receive_response()?;
    match &reply.response {
        Response::Success { payload } => {
            println!("{}", format_frame(payload));
        }
        Response::DeviceError { code } => {
            println!("error {}", format_byte(*code));
        }
    }
    reply.into_result().map(|_| ())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_byte_arg() {
        assert_eq!(parse_byte_arg("0").unwrap(), 0);
        assert_eq!(parse_byte_arg(" 255 ").unwrap(), 255);
        assert_eq!(parse_byte_arg("0x02").unwrap(), 0x02);
        assert_eq!(parse_byte_arg("0XA0").unwrap(), 0xA0);
        assert!(parse_byte_arg("0x100").is_err());
        assert!(parse_byte_arg("-1").is_err());
        assert!(parse_byte_arg("port").unwrap_err().contains("invalid byte 'port'"));
    }

    #[test]
    fn test_parse_hex_arg() {
        assert_eq!(parse_hex_arg("000201").unwrap(), HexBytes(vec![0x00, 0x02, 0x01]));
        assert_eq!(parse_hex_arg("0x01 02").unwrap(), HexBytes(vec![0x01, 0x02]));
        assert_eq!(parse_hex_arg("aa:bb").unwrap(), HexBytes(vec![0xAA, 0xBB]));
        assert_eq!(parse_hex_arg("").unwrap(), HexBytes(Vec::new()));
        assert!(parse_hex_arg("abc").is_err());
        assert!(parse_hex_arg("zz").unwrap_err().starts_with("invalid hex"));
    }

    #[test]
    fn test_raw_subcommand_parses_bytes() {
        let args = Args::try_parse_from(["iolhat", "-p", "12010", "raw", "0x01", "000201", "--len", "2"])
            .unwrap();
        match args.command {
            Commands::Raw {
                command_id,
                args,
                len,
            } => {
                assert_eq!(command_id, 0x01);
                assert_eq!(args, HexBytes(vec![0x00, 0x02, 0x01]));
                assert_eq!(len, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_raw_subcommand_rejects_bad_hex() {
        let result = Args::try_parse_from(["iolhat", "-p", "12010", "raw", "0x01", "0g", "--len", "2"]);
        assert!(result.is_err());
    }
}
