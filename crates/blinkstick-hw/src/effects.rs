//! Blocking colour animations.

use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::color::Rgb;
use crate::device::{BlinkStick, LedAddress};
use crate::transport::Transport;
use crate::Result;

/// Yields the `steps` colours strictly between `start` and `end`.
pub fn gradient(start: Rgb, end: Rgb, steps: u32) -> impl Iterator<Item = Rgb> {
    let total = steps as f64 + 1.0;
    (1..=steps).map(move |n| {
        let d = n as f64 / total;
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - d) + b as f64 * d) as u8;
        Rgb::new(mix(start.r, end.r), mix(start.g, end.g), mix(start.b, end.b))
    })
}

/// Sleep between two gradient steps.
fn step_delay(duration: Duration, steps: u32) -> Duration {
    duration / steps.saturating_add(1)
}

/// Undoes the brightness limit on the colour read back from the device.
/// A colour brighter than the current limit allows starts from black.
fn morph_start(current: Rgb, max: u8) -> Rgb {
    let out_of_range = |v: u8| max > 0 && v as u32 * 255 / max as u32 > 255;
    if [current.r, current.g, current.b].into_iter().any(out_of_range) {
        Rgb::BLACK
    } else {
        current.remap_reverse(max)
    }
}

impl<T: Transport> BlinkStick<T> {
    /// Fades from the current colour of `address` to `target` over
    /// `duration`.
    pub fn morph(
        &mut self,
        address: LedAddress,
        target: Rgb,
        duration: Duration,
        steps: u32,
    ) -> Result<()> {
        let start = morph_start(self.get_color(address.index)?, self.max_rgb_value());
        let delay = step_delay(duration, steps);
        debug!(
            "Morphing {} from {} to {} in {} steps",
            self.serial(),
            start,
            target,
            steps
        );

        self.set_color(address, start)?;
        for color in gradient(start, target, steps) {
            self.set_color(address, color)?;
            thread::sleep(delay);
        }
        self.set_color(address, target)
    }

    /// Flashes `color` on and off `repeats` times, `delay` apart.
    pub fn blink(
        &mut self,
        address: LedAddress,
        color: Rgb,
        repeats: u32,
        delay: Duration,
    ) -> Result<()> {
        for n in 0..repeats {
            if n > 0 {
                thread::sleep(delay);
            }
            self.set_color(address, color)?;
            thread::sleep(delay);
            self.set_color(address, Rgb::BLACK)?;
        }
        Ok(())
    }

    /// Morphs from black to `color` and back `repeats` times.
    pub fn pulse(
        &mut self,
        address: LedAddress,
        color: Rgb,
        repeats: u32,
        duration: Duration,
        steps: u32,
    ) -> Result<()> {
        self.set_color(address, Rgb::BLACK)?;
        for _ in 0..repeats {
            self.morph(address, color, duration, steps)?;
            self.morph(address, Rgb::BLACK, duration, steps)?;
        }
        Ok(())
    }
}
