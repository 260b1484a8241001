//! BlinkStick protocol definitions and encoding.
//!
//! Every operation is a HID feature report; byte 0 of each buffer is the
//! report ID.
//! - 0x01: colour of the first LED (`[id, r, g, b]`)
//! - 0x02, 0x03: info blocks (id + 32 data bytes)
//! - 0x04: Pro mode
//! - 0x05: colour of one LED addressed by channel and index
//! - 0x06..=0x09: LED data frames for 8, 16, 32 and 64 LEDs (GRB order)
//! - 0x81: LED count

use crate::{Error, Result};
use std::str::FromStr;

/// Report carrying the colour of LED 0 on channel 0.
pub const REPORT_COLOR: u8 = 0x01;

/// Report carrying the colour of a single addressed LED.
pub const REPORT_INDEXED_COLOR: u8 = 0x05;

/// Report carrying the Pro mode.
pub const REPORT_MODE: u8 = 0x04;

/// Report carrying the configured LED count.
pub const REPORT_LED_COUNT: u8 = 0x81;

/// Size of a colour read (report byte + 32 bytes).
pub const COLOR_REPORT_SIZE: usize = 33;

/// Size of mode and LED count reads.
pub const SHORT_REPORT_SIZE: usize = 2;

/// Header of an LED data frame: report byte + channel byte.
pub const FRAME_HEADER_SIZE: usize = 2;

/// Largest number of LEDs a single frame can carry.
pub const MAX_LEDS: usize = 64;

/// LED data frame reports, ordered by capacity.
const FRAME_REPORTS: [(u8, usize); 4] = [(0x06, 8), (0x07, 16), (0x08, 32), (0x09, 64)];

/// Device modes supported by BlinkStick Pro firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Mode {
    /// R, G and B outputs drive a single RGB LED.
    #[default]
    Normal = 0,
    /// Same as normal with inverted outputs (common anode LEDs).
    Inverse = 1,
    /// Up to 64 WS2812 LEDs on each of the R, G and B outputs.
    Ws2812 = 2,
    /// WS2812 mode with channel 0 data mirrored to all outputs.
    Ws2812Mirror = 3,
}

impl Mode {
    /// Converts a byte value to Mode.
    pub fn from_byte(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Mode::Normal),
            1 => Ok(Mode::Inverse),
            2 => Ok(Mode::Ws2812),
            3 => Ok(Mode::Ws2812Mirror),
            _ => Err(Error::InvalidMode(value.to_string())),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Mode::Normal),
            "inverse" => Ok(Mode::Inverse),
            "ws2812" => Ok(Mode::Ws2812),
            "ws2812-mirror" | "mirror" => Ok(Mode::Ws2812Mirror),
            other => other
                .parse::<u8>()
                .map_err(|_| Error::InvalidMode(s.to_string()))
                .and_then(Mode::from_byte),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Normal => write!(f, "normal"),
            Mode::Inverse => write!(f, "inverse"),
            Mode::Ws2812 => write!(f, "ws2812"),
            Mode::Ws2812Mirror => write!(f, "ws2812-mirror"),
        }
    }
}

/// Picks the smallest LED data report able to hold `led_count` LEDs.
///
/// Returns the report ID and its LED capacity.
pub fn frame_report_for(led_count: usize) -> Result<(u8, usize)> {
    FRAME_REPORTS
        .iter()
        .copied()
        .find(|&(_, capacity)| led_count <= capacity)
        .ok_or(Error::TooManyLeds(led_count))
}

/// Builds a colour packet, choosing the short form for LED 0 on channel 0.
pub fn build_color_packet(channel: u8, index: u8, r: u8, g: u8, b: u8) -> Vec<u8> {
    if channel == 0 && index == 0 {
        vec![REPORT_COLOR, r, g, b]
    } else {
        vec![REPORT_INDEXED_COLOR, channel, index, r, g, b]
    }
}

/// Builds an LED data frame for a channel from GRB bytes.
///
/// The payload is zero padded to the capacity of the chosen report.
pub fn build_frame_packet(channel: u8, grb: &[u8]) -> Result<Vec<u8>> {
    let (report_id, capacity) = frame_report_for(grb.len().div_ceil(3))?;
    let mut buffer = vec![0u8; FRAME_HEADER_SIZE + capacity * 3];
    buffer[0] = report_id;
    buffer[1] = channel;
    buffer[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + grb.len()].copy_from_slice(grb);
    Ok(buffer)
}

/// Builds a mode packet.
pub fn build_mode_packet(mode: Mode) -> [u8; 2] {
    [REPORT_MODE, mode as u8]
}

/// Builds an LED count packet.
pub fn build_led_count_packet(count: u8) -> [u8; 2] {
    [REPORT_LED_COUNT, count]
}

/// Checks that a reply holds at least `expected` bytes.
pub fn ensure_len(report_id: u8, reply: &[u8], expected: usize) -> Result<()> {
    if reply.len() < expected {
        return Err(Error::ShortReport {
            report_id,
            expected,
            actual: reply.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_packet_short_form() {
        assert_eq!(build_color_packet(0, 0, 1, 2, 3), vec![0x01, 1, 2, 3]);
    }

    #[test]
    fn test_color_packet_indexed() {
        assert_eq!(
            build_color_packet(0, 4, 10, 20, 30),
            vec![0x05, 0, 4, 10, 20, 30]
        );
        assert_eq!(build_color_packet(2, 0, 1, 2, 3)[0], REPORT_INDEXED_COLOR);
    }

    #[test]
    fn test_frame_report_selection() {
        assert_eq!(frame_report_for(0).unwrap(), (0x06, 8));
        assert_eq!(frame_report_for(8).unwrap(), (0x06, 8));
        assert_eq!(frame_report_for(9).unwrap(), (0x07, 16));
        assert_eq!(frame_report_for(32).unwrap(), (0x08, 32));
        assert_eq!(frame_report_for(64).unwrap(), (0x09, 64));
        assert!(matches!(frame_report_for(65), Err(Error::TooManyLeds(65))));
    }

    #[test]
    fn test_frame_packet_padding() {
        let packet = build_frame_packet(1, &[9, 8, 7, 6, 5, 4]).unwrap();
        assert_eq!(packet.len(), 2 + 8 * 3);
        assert_eq!(&packet[..8], &[0x06, 1, 9, 8, 7, 6, 5, 4]);
        assert!(packet[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_frame_packet_partial_led_rounds_up() {
        // 25 bytes is 9 LEDs worth of data, which needs the 16 LED report
        let packet = build_frame_packet(0, &[1; 25]).unwrap();
        assert_eq!(packet[0], 0x07);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("normal".parse::<Mode>().unwrap(), Mode::Normal);
        assert_eq!("2".parse::<Mode>().unwrap(), Mode::Ws2812);
        assert_eq!("mirror".parse::<Mode>().unwrap(), Mode::Ws2812Mirror);
        assert!("7".parse::<Mode>().is_err());
        assert!("bogus".parse::<Mode>().is_err());
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len(4, &[4, 2], 2).is_ok());
        assert!(matches!(
            ensure_len(4, &[4], 2),
            Err(Error::ShortReport {
                report_id: 4,
                expected: 2,
                actual: 1
            })
        ));
    }
}
