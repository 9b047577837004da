//! Helpers for displaying frames in logs and CLI output.
//!
//! # Example
//!
//! ```
//! use iol_hat::utils::{format_byte, format_frame};
//!
//! assert_eq!(format_frame(&[0x01, 0x00, 0xFF]), "01 00 FF");
//! assert_eq!(format_byte(0x04), "0x04");
//! ```

/// Formats bytes as space separated upper-case hex pairs.
///
/// # Example
///
/// ```
/// use iol_hat::utils::format_frame;
///
/// assert_eq!(format_frame(&[0x02, 0x01, 0x02, 0x03]), "02 01 02 03");
/// assert_eq!(format_frame(&[]), "");
/// ```
pub fn format_frame(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats a single byte as "0x00".
pub fn format_byte(value: u8) -> String {
    format!("0x{:02X}", value)
}
