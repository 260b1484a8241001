//! BlinkStick device controller.

use tracing::{debug, warn};

use crate::color::{ColorFormat, Rgb};
use crate::info_block::{InfoBlock, INFO_BLOCK_REPORT_SIZE};
use crate::protocol::{
    build_color_packet, build_frame_packet, build_led_count_packet, build_mode_packet, ensure_len,
    frame_report_for, Mode, COLOR_REPORT_SIZE, FRAME_HEADER_SIZE, REPORT_COLOR, REPORT_LED_COUNT,
    REPORT_MODE, SHORT_REPORT_SIZE,
};
use crate::transport::{DeviceInfo, HidTransport, Transport};
use crate::variant::Variant;
use crate::Result;

/// Address of a single LED: the output channel (R=0, G=1, B=2 pins on a
/// Pro) and the position in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedAddress {
    pub channel: u8,
    pub index: u8,
}

impl LedAddress {
    /// The first LED, addressed through the plain colour report.
    pub const FIRST: LedAddress = LedAddress {
        channel: 0,
        index: 0,
    };

    pub fn new(channel: u8, index: u8) -> Self {
        Self { channel, index }
    }
}

/// One connected BlinkStick.
///
/// Colours written through [`BlinkStick::set_color`] are scaled by the
/// brightness limit and inverted when inverse mode is on; reads of LED 0
/// undo the inversion.
pub struct BlinkStick<T = HidTransport> {
    info: DeviceInfo,
    transport: T,
    inverse: bool,
    max_rgb_value: u8,
    error_reporting: bool,
}

impl<T: Transport> BlinkStick<T> {
    /// Wraps an open transport.
    pub fn new(info: DeviceInfo, transport: T) -> Self {
        Self {
            info,
            transport,
            inverse: false,
            max_rgb_value: 255,
            error_reporting: true,
        }
    }

    /// Serial number, `BSnnnnnn-M.m`.
    pub fn serial(&self) -> &str {
        &self.info.serial
    }

    /// Manufacturer string.
    pub fn manufacturer(&self) -> &str {
        &self.info.manufacturer
    }

    /// Product description string.
    pub fn description(&self) -> &str {
        &self.info.description
    }

    /// USB release number.
    pub fn version_attribute(&self) -> u16 {
        self.info.version_attribute
    }

    /// Enumeration data.
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Product variant derived from serial and release number.
    pub fn variant(&self) -> Variant {
        Variant::from_serial(&self.info.serial, self.info.version_attribute)
    }

    /// Product variant name, e.g. "BlinkStick Pro".
    pub fn variant_string(&self) -> &'static str {
        self.variant().description()
    }

    /// When disabled, colour writes that fail are logged and ignored.
    pub fn set_error_reporting(&mut self, enabled: bool) {
        self.error_reporting = enabled;
    }

    pub fn error_reporting(&self) -> bool {
        self.error_reporting
    }

    /// Software inverse mode for common anode LEDs. Pro devices can store
    /// this permanently with [`Mode::Inverse`].
    pub fn set_inverse(&mut self, inverse: bool) {
        self.inverse = inverse;
    }

    pub fn inverse(&self) -> bool {
        self.inverse
    }

    /// Caps every channel written by [`BlinkStick::set_color`] at `value`.
    pub fn set_max_rgb_value(&mut self, value: u8) {
        self.max_rgb_value = value;
    }

    pub fn max_rgb_value(&self) -> u8 {
        self.max_rgb_value
    }

    /// Sets the colour of one LED.
    pub fn set_color(&mut self, address: LedAddress, color: Rgb) -> Result<()> {
        let mut rgb = color.remap(self.max_rgb_value);
        if self.inverse {
            rgb = rgb.inverted();
        }

        let packet = build_color_packet(address.channel, address.index, rgb.r, rgb.g, rgb.b);
        match self.transport.send_feature_report(&packet) {
            Err(e) if !self.error_reporting => {
                warn!("Ignoring error setting color on {}: {}", self.info.serial, e);
                Ok(())
            }
            result => result,
        }
    }

    /// Reads the colour of the LED at `index`.
    ///
    /// LED 0 is read from the colour report; other LEDs from the LED data
    /// frame stored in device RAM.
    pub fn get_color(&mut self, index: u8) -> Result<Rgb> {
        if index == 0 {
            let reply = self
                .transport
                .get_feature_report(REPORT_COLOR, COLOR_REPORT_SIZE)?;
            ensure_len(REPORT_COLOR, &reply, 4)?;

            let rgb = Rgb::new(reply[1], reply[2], reply[3]);
            return Ok(if self.inverse { rgb.inverted() } else { rgb });
        }

        let data = self.get_led_data(index as usize + 1)?;
        let offset = index as usize * 3;
        Ok(Rgb::from_grb([data[offset], data[offset + 1], data[offset + 2]]))
    }

    /// Reads the colour of the LED at `index` as `#rrggbb`.
    pub fn get_color_hex(&mut self, index: u8) -> Result<String> {
        self.get_color_formatted(index, ColorFormat::Hex)
    }

    /// Reads the colour of the LED at `index` in the given format.
    pub fn get_color_formatted(&mut self, index: u8, format: ColorFormat) -> Result<String> {
        Ok(format.format(self.get_color(index)?))
    }

    /// Sets the first LED to a random colour and returns it.
    pub fn set_random_color(&mut self) -> Result<Rgb> {
        let rgb = Rgb::random();
        self.set_color(LedAddress::FIRST, rgb)?;
        Ok(rgb)
    }

    /// Turns the first LED off.
    pub fn turn_off(&mut self) -> Result<()> {
        self.set_color(LedAddress::FIRST, Rgb::BLACK)
    }

    /// Sends an LED data frame (GRB bytes) to a channel.
    pub fn set_led_data(&mut self, channel: u8, grb: &[u8]) -> Result<()> {
        let packet = build_frame_packet(channel, grb)?;
        debug!(
            "Sending {} LED frame on channel {} to {}",
            grb.len() / 3,
            channel,
            self.info.serial
        );
        self.transport.send_feature_report(&packet)
    }

    /// Reads the GRB data of the first `count` LEDs from device RAM.
    pub fn get_led_data(&mut self, count: usize) -> Result<Vec<u8>> {
        let (report_id, capacity) = frame_report_for(count)?;
        let reply = self
            .transport
            .get_feature_report(report_id, FRAME_HEADER_SIZE + capacity * 3)?;
        ensure_len(report_id, &reply, FRAME_HEADER_SIZE + count * 3)?;
        Ok(reply[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + count * 3].to_vec())
    }

    /// Stores the Pro mode on the device.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.transport.send_feature_report(&build_mode_packet(mode))?;
        debug!("Set mode of {} to {}", self.info.serial, mode);
        Ok(())
    }

    /// Reads the Pro mode.
    pub fn get_mode(&mut self) -> Result<Mode> {
        let reply = self
            .transport
            .get_feature_report(REPORT_MODE, SHORT_REPORT_SIZE)?;
        ensure_len(REPORT_MODE, &reply, SHORT_REPORT_SIZE)?;
        Mode::from_byte(reply[1])
    }

    /// Sets the number of LEDs driven by devices that support it.
    pub fn set_led_count(&mut self, count: u8) -> Result<()> {
        self.transport
            .send_feature_report(&build_led_count_packet(count))
    }

    /// Reads the number of LEDs.
    pub fn get_led_count(&mut self) -> Result<u8> {
        let reply = self
            .transport
            .get_feature_report(REPORT_LED_COUNT, SHORT_REPORT_SIZE)?;
        ensure_len(REPORT_LED_COUNT, &reply, SHORT_REPORT_SIZE)?;
        Ok(reply[1])
    }

    /// Reads the text stored in an info block.
    pub fn get_info_block(&mut self, block: InfoBlock) -> Result<String> {
        let reply = self
            .transport
            .get_feature_report(block.report_id(), INFO_BLOCK_REPORT_SIZE)?;
        Ok(InfoBlock::decode(&reply))
    }

    /// Replaces the text stored in an info block.
    pub fn set_info_block(&mut self, block: InfoBlock, text: &str) -> Result<()> {
        self.transport.send_feature_report(&block.encode(text))?;
        debug!("Wrote {} of {}", block, self.info.serial);
        Ok(())
    }

    /// Info block 1, conventionally the device name.
    pub fn info_block1(&mut self) -> Result<String> {
        self.get_info_block(InfoBlock::One)
    }

    pub fn set_info_block1(&mut self, text: &str) -> Result<()> {
        self.set_info_block(InfoBlock::One, text)
    }

    /// Info block 2, free-form.
    pub fn info_block2(&mut self) -> Result<String> {
        self.get_info_block(InfoBlock::Two)
    }

    pub fn set_info_block2(&mut self, text: &str) -> Result<()> {
        self.set_info_block(InfoBlock::Two, text)
    }
}
