//! Per-channel LED strip buffer.

use std::thread;
use std::time::Duration;

use tracing::debug;

use super::CHANNELS;
use crate::color::Rgb;
use crate::device::BlinkStick;
use crate::protocol::MAX_LEDS;
use crate::transport::Transport;
use crate::{Error, Result};

/// LED chains attached to the three Pro channels.
#[derive(Debug, Clone)]
pub struct ProStrip {
    channels: [Vec<Rgb>; CHANNELS],
    delay: Duration,
    max_rgb_value: u8,
}

impl ProStrip {
    /// Creates a black buffer with `counts[c]` LEDs on channel `c`.
    ///
    /// `delay` is waited after every frame sent, giving the firmware time to
    /// clock the data out.
    pub fn new(counts: [usize; CHANNELS], delay: Duration, max_rgb_value: u8) -> Result<Self> {
        if let Some(&count) = counts.iter().find(|&&c| c > MAX_LEDS) {
            return Err(Error::TooManyLeds(count));
        }
        Ok(Self {
            channels: counts.map(|count| vec![Rgb::BLACK; count]),
            delay,
            max_rgb_value,
        })
    }

    /// Number of LEDs on a channel.
    pub fn led_count(&self, channel: u8) -> usize {
        self.channels
            .get(channel as usize)
            .map_or(0, |leds| leds.len())
    }

    pub fn max_rgb_value(&self) -> u8 {
        self.max_rgb_value
    }

    /// Sets one LED. With `remap` the colour is scaled by the brightness
    /// limit.
    pub fn set_color(&mut self, channel: u8, index: usize, rgb: Rgb, remap: bool) -> Result<()> {
        let rgb = if remap {
            rgb.remap(self.max_rgb_value)
        } else {
            rgb
        };
        let led = self
            .channels
            .get_mut(channel as usize)
            .and_then(|leds| leds.get_mut(index))
            .ok_or(Error::LedOutOfRange { channel, index })?;
        *led = rgb;
        Ok(())
    }

    /// Returns the buffered colour of one LED.
    pub fn get_color(&self, channel: u8, index: usize) -> Result<Rgb> {
        self.channels
            .get(channel as usize)
            .and_then(|leds| leds.get(index))
            .copied()
            .ok_or(Error::LedOutOfRange { channel, index })
    }

    /// Blanks every LED in the buffer.
    pub fn clear(&mut self) {
        for leds in &mut self.channels {
            leds.fill(Rgb::BLACK);
        }
    }

    /// GRB bytes of a channel, ready for [`BlinkStick::set_led_data`].
    pub fn frame(&self, channel: u8) -> Vec<u8> {
        self.channels
            .get(channel as usize)
            .map(|leds| leds.iter().flat_map(|rgb| rgb.to_grb()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn replace_channel(&mut self, channel: u8, leds: Vec<Rgb>) {
        if let Some(slot) = self.channels.get_mut(channel as usize) {
            *slot = leds;
        }
    }

    /// Sends one channel to the device.
    pub fn send_data<T: Transport>(&self, stick: &mut BlinkStick<T>, channel: u8) -> Result<()> {
        let frame = self.frame(channel);
        stick.set_led_data(channel, &frame)?;
        debug!("Sent {} LEDs on channel {}", frame.len() / 3, channel);
        thread::sleep(self.delay);
        Ok(())
    }

    /// Sends every channel that has LEDs.
    pub fn send_data_all<T: Transport>(&self, stick: &mut BlinkStick<T>) -> Result<()> {
        for channel in 0..CHANNELS as u8 {
            if self.led_count(channel) > 0 {
                self.send_data(stick, channel)?;
            }
        }
        Ok(())
    }

    /// Clears the buffer and turns every LED off on the device.
    pub fn off<T: Transport>(&mut self, stick: &mut BlinkStick<T>) -> Result<()> {
        self.clear();
        self.send_data_all(stick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBackend, SimDevice, SimTransport};
    use crate::transport::Backend;

    fn open(device: &SimDevice) -> BlinkStick<SimTransport> {
        let backend = SimBackend::new().with_device(device.clone());
        let info = device.info();
        let transport = backend.open(&info).unwrap();
        BlinkStick::new(info, transport)
    }

    #[test]
    fn test_new_rejects_long_chains() {
        assert!(matches!(
            ProStrip::new([8, 65, 0], Duration::ZERO, 255),
            Err(Error::TooManyLeds(65))
        ));
    }

    #[test]
    fn test_set_and_get() {
        let mut strip = ProStrip::new([8, 0, 4], Duration::ZERO, 255).unwrap();
        strip.set_color(2, 3, Rgb::new(1, 2, 3), true).unwrap();
        assert_eq!(strip.get_color(2, 3).unwrap(), Rgb::new(1, 2, 3));
        assert_eq!(strip.frame(2)[9..12], [2, 1, 3]);
    }

    #[test]
    fn test_out_of_range() {
        let mut strip = ProStrip::new([8, 0, 0], Duration::ZERO, 255).unwrap();
        assert!(matches!(
            strip.set_color(0, 8, Rgb::BLACK, false),
            Err(Error::LedOutOfRange {
                channel: 0,
                index: 8
            })
        ));
        assert!(strip.set_color(1, 0, Rgb::BLACK, false).is_err());
        assert!(strip.get_color(3, 0).is_err());
    }

    #[test]
    fn test_remap() {
        let mut strip = ProStrip::new([2, 0, 0], Duration::ZERO, 51).unwrap();
        strip.set_color(0, 0, Rgb::new(255, 255, 0), true).unwrap();
        strip.set_color(0, 1, Rgb::new(255, 255, 0), false).unwrap();
        assert_eq!(strip.get_color(0, 0).unwrap(), Rgb::new(51, 51, 0));
        assert_eq!(strip.get_color(0, 1).unwrap(), Rgb::new(255, 255, 0));
    }

    #[test]
    fn test_send_data_all_skips_empty_channels() {
        let device = SimDevice::new("BS000001-2.0", 0);
        let mut stick = open(&device);
        let mut strip = ProStrip::new([8, 0, 16], Duration::ZERO, 255).unwrap();
        strip.set_color(2, 15, Rgb::new(9, 8, 7), false).unwrap();

        strip.send_data_all(&mut stick).unwrap();

        let sent = device.sent_reports();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0][..2], [0x06, 0]);
        assert_eq!(sent[1][..2], [0x07, 2]);
        assert_eq!(device.led(2, 15), Rgb::new(9, 8, 7));
    }

    #[test]
    fn test_off() {
        let device = SimDevice::new("BS000001-2.0", 0);
        let mut stick = open(&device);
        let mut strip = ProStrip::new([4, 0, 0], Duration::ZERO, 255).unwrap();
        strip.set_color(0, 1, Rgb::new(255, 0, 0), false).unwrap();
        strip.send_data_all(&mut stick).unwrap();
        assert_eq!(device.led(0, 1), Rgb::new(255, 0, 0));

        strip.off(&mut stick).unwrap();
        assert_eq!(strip.get_color(0, 1).unwrap(), Rgb::BLACK);
        assert_eq!(device.led(0, 1), Rgb::BLACK);
    }
}
