//! Error types for the BlinkStick hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when interacting with the hardware.
#[derive(Error, Debug)]
pub enum Error {
    /// USB HID communication error.
    #[error("USB HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// Device stopped responding and could not be found again.
    #[error("Could not communicate with BlinkStick {0} - it may have been removed")]
    Disconnected(String),

    /// Device path could not be turned into a C string.
    #[error("Invalid device path: {0}")]
    InvalidPath(String),

    /// Colour string is neither a hex value nor a known name.
    #[error("Invalid color: {0} (use #RRGGBB, #RGB or a CSS color name)")]
    InvalidColor(String),

    /// Color format name not recognised.
    #[error("Invalid color format: {0} (use rgb or hex)")]
    InvalidFormat(String),

    /// Mode value outside the supported range.
    #[error("Invalid mode: {0} (use 0-3 or normal, inverse, ws2812, ws2812-mirror)")]
    InvalidMode(String),

    /// LED address outside the frame buffer or the device range.
    #[error("LED out of range: channel {channel}, index {index}")]
    LedOutOfRange { channel: u8, index: usize },

    /// LED data frame larger than the biggest report.
    #[error("Too many LEDs for a single frame: {0} (maximum 64)")]
    TooManyLeds(usize),

    /// Device returned fewer bytes than the report needs.
    #[error("Short report 0x{report_id:02X}: expected {expected} bytes, got {actual}")]
    ShortReport {
        report_id: u8,
        expected: usize,
        actual: usize,
    },

    /// Digit outside 0..=9 passed to the matrix renderer.
    #[error("Invalid digit: {0}")]
    InvalidDigit(u8),
}
