//! LED matrices spread over the Pro channels.
//!
//! Matrices on channels R, G and B are placed side by side: the combined
//! canvas is as wide as all their columns together and as tall as the
//! tallest one. Coordinates may be negative or past the edge; such pixels
//! are clipped.

use std::time::Duration;

use super::{ProStrip, CHANNELS};
use crate::color::Rgb;
use crate::device::BlinkStick;
use crate::transport::Transport;
use crate::{Error, Result};

/// 3x5 digit glyphs, one byte per row, bit 2 is the leftmost column.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Canvas over one matrix per channel.
#[derive(Debug, Clone)]
pub struct ProMatrix {
    strip: ProStrip,
    columns: [usize; CHANNELS],
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl ProMatrix {
    /// `columns[c]` x `rows[c]` is the size of the matrix on channel `c`.
    pub fn new(
        columns: [usize; CHANNELS],
        rows: [usize; CHANNELS],
        delay: Duration,
        max_rgb_value: u8,
    ) -> Result<Self> {
        let counts = [0, 1, 2].map(|c| columns[c] * rows[c]);
        let strip = ProStrip::new(counts, delay, max_rgb_value)?;
        let width = columns.iter().sum();
        let height = rows.iter().copied().max().unwrap_or(0);

        Ok(Self {
            strip,
            columns,
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Sets one pixel; pixels outside the canvas are ignored.
    pub fn set_color(&mut self, x: i32, y: i32, rgb: Rgb, remap: bool) {
        let rgb = if remap {
            rgb.remap(self.strip.max_rgb_value())
        } else {
            rgb
        };
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = rgb;
        }
    }

    /// Returns one pixel, or `None` outside the canvas.
    pub fn get_color(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Blanks the canvas.
    pub fn clear(&mut self) {
        self.pixels.fill(Rgb::BLACK);
    }

    /// Moves every pixel one column left. The first column wraps around to
    /// the last unless `remove` is set, in which case the last column is
    /// blanked.
    pub fn shift_left(&mut self, remove: bool) {
        if self.width == 0 {
            return;
        }
        let last = self.width - 1;
        for row in self.pixels.chunks_mut(self.width) {
            row.rotate_left(1);
            if remove {
                row[last] = Rgb::BLACK;
            }
        }
    }

    /// Moves every pixel one column right.
    pub fn shift_right(&mut self, remove: bool) {
        if self.width == 0 {
            return;
        }
        for row in self.pixels.chunks_mut(self.width) {
            row.rotate_right(1);
            if remove {
                row[0] = Rgb::BLACK;
            }
        }
    }

    /// Moves every pixel one row up.
    pub fn shift_up(&mut self, remove: bool) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        self.pixels.rotate_left(self.width);
        if remove {
            let start = (self.height - 1) * self.width;
            self.pixels[start..].fill(Rgb::BLACK);
        }
    }

    /// Moves every pixel one row down.
    pub fn shift_down(&mut self, remove: bool) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        self.pixels.rotate_right(self.width);
        if remove {
            self.pixels[..self.width].fill(Rgb::BLACK);
        }
    }

    /// Draws a line with Bresenham's algorithm and returns the points drawn,
    /// ordered from `(x1, y1)` to `(x2, y2)`.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, rgb: Rgb) -> Vec<(i32, i32)> {
        let steep = (y2 - y1).abs() > (x2 - x1).abs();
        let (mut x1, mut y1, mut x2, mut y2) = if steep {
            (y1, x1, y2, x2)
        } else {
            (x1, y1, x2, y2)
        };

        let reversed = x1 > x2;
        if reversed {
            std::mem::swap(&mut x1, &mut x2);
            std::mem::swap(&mut y1, &mut y2);
        }

        let dx = x2 - x1;
        let dy = (y2 - y1).abs();
        let y_step = if y1 < y2 { 1 } else { -1 };
        let mut error = dx / 2;
        let mut y = y1;

        let mut points = Vec::with_capacity(dx as usize + 1);
        for x in x1..=x2 {
            let point = if steep { (y, x) } else { (x, y) };
            self.set_color(point.0, point.1, rgb, true);
            points.push(point);

            error -= dy;
            if error < 0 {
                y += y_step;
                error += dx;
            }
        }

        if reversed {
            points.reverse();
        }
        points
    }

    /// Draws the outline of the rectangle with corners `(x1, y1)` and
    /// `(x2, y2)`.
    pub fn rectangle(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, rgb: Rgb) {
        self.line(x1, y1, x1, y2, rgb);
        self.line(x1, y1, x2, y1, rgb);
        self.line(x2, y1, x2, y2, rgb);
        self.line(x1, y2, x2, y2, rgb);
    }

    /// Draws a 3x5 digit with its top left corner at `(x, y)`.
    pub fn number(&mut self, x: i32, y: i32, digit: u8, rgb: Rgb) -> Result<()> {
        let glyph = DIGITS
            .get(digit as usize)
            .ok_or(Error::InvalidDigit(digit))?;

        for (dy, bits) in glyph.iter().enumerate() {
            for dx in 0..3 {
                if bits & (0b100 >> dx) != 0 {
                    self.set_color(x + dx, y + dy as i32, rgb, true);
                }
            }
        }
        Ok(())
    }

    /// Copies the columns belonging to `channel` into its LED chain, row by
    /// row, and sends it.
    pub fn send_data<T: Transport>(
        &mut self,
        stick: &mut BlinkStick<T>,
        channel: u8,
    ) -> Result<()> {
        let c = channel as usize;
        if c >= CHANNELS {
            return Err(Error::LedOutOfRange { channel, index: 0 });
        }

        let start = self.columns[..c].iter().sum::<usize>();
        let end = start + self.columns[c];
        let leds: Vec<Rgb> = self
            .pixels
            .chunks(self.width.max(1))
            .flat_map(|row| row[start..end].iter().copied())
            .collect();

        self.strip.replace_channel(channel, leds);
        self.strip.send_data(stick, channel)
    }

    /// Sends every channel that has a matrix attached.
    pub fn send_data_all<T: Transport>(&mut self, stick: &mut BlinkStick<T>) -> Result<()> {
        for channel in 0..CHANNELS as u8 {
            if self.columns[channel as usize] > 0 {
                self.send_data(stick, channel)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBackend, SimDevice, SimTransport};
    use crate::transport::Backend;

    const RED: Rgb = Rgb::new(255, 0, 0);

    fn matrix(width: usize, height: usize) -> ProMatrix {
        ProMatrix::new([width, 0, 0], [height, 0, 0], Duration::ZERO, 255).unwrap()
    }

    fn lit(m: &ProMatrix) -> Vec<(i32, i32)> {
        let mut points = Vec::new();
        for y in 0..m.height() as i32 {
            for x in 0..m.width() as i32 {
                if m.get_color(x, y) != Some(Rgb::BLACK) {
                    points.push((x, y));
                }
            }
        }
        points
    }

    #[test]
    fn test_dimensions() {
        let m = ProMatrix::new([8, 8, 0], [8, 4, 0], Duration::ZERO, 255).unwrap();
        assert_eq!(m.width(), 16);
        assert_eq!(m.height(), 8);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut m = matrix(4, 4);
        m.set_color(-1, 0, RED, false);
        m.set_color(4, 0, RED, false);
        m.set_color(0, 4, RED, false);
        assert!(lit(&m).is_empty());
        assert_eq!(m.get_color(4, 0), None);
        assert_eq!(m.get_color(0, -1), None);
    }

    #[test]
    fn test_shift_left_wraps() {
        let mut m = matrix(4, 2);
        m.set_color(0, 1, RED, false);
        m.shift_left(false);
        assert_eq!(lit(&m), vec![(3, 1)]);
        m.shift_left(true);
        assert_eq!(lit(&m), vec![(2, 1)]);
    }

    #[test]
    fn test_shift_right_remove() {
        let mut m = matrix(4, 2);
        m.set_color(3, 0, RED, false);
        m.shift_right(true);
        assert!(lit(&m).is_empty());

        m.set_color(3, 0, RED, false);
        m.shift_right(false);
        assert_eq!(lit(&m), vec![(0, 0)]);
    }

    #[test]
    fn test_shift_vertical() {
        let mut m = matrix(3, 3);
        m.set_color(1, 0, RED, false);
        m.shift_up(false);
        assert_eq!(lit(&m), vec![(1, 2)]);
        m.shift_down(false);
        assert_eq!(lit(&m), vec![(1, 0)]);
        m.shift_down(false);
        m.shift_down(false);
        assert_eq!(lit(&m), vec![(1, 2)]);
        m.shift_down(true);
        assert!(lit(&m).is_empty());
    }

    #[test]
    fn test_shift_empty_matrix() {
        let mut m = matrix(0, 0);
        m.shift_left(true);
        m.shift_right(false);
        m.shift_up(true);
        m.shift_down(false);
        assert_eq!(m.width(), 0);
    }

    #[test]
    fn test_line_points() {
        let mut m = matrix(8, 8);
        assert_eq!(
            m.line(0, 0, 3, 0, RED),
            vec![(0, 0), (1, 0), (2, 0), (3, 0)]
        );
        assert_eq!(m.line(2, 3, 2, 1, RED), vec![(2, 3), (2, 2), (2, 1)]);
        assert_eq!(
            m.line(0, 0, 3, 3, RED),
            vec![(0, 0), (1, 1), (2, 2), (3, 3)]
        );
        assert_eq!(m.line(5, 5, 5, 5, RED), vec![(5, 5)]);
    }

    #[test]
    fn test_rectangle() {
        let mut m = matrix(4, 4);
        m.rectangle(0, 0, 2, 2, RED);
        assert_eq!(lit(&m).len(), 8);
        assert_eq!(m.get_color(1, 1), Some(Rgb::BLACK));
    }

    #[test]
    fn test_number_glyphs() {
        let mut m = matrix(3, 5);
        m.number(0, 0, 1, RED).unwrap();
        assert_eq!(
            lit(&m),
            vec![(1, 0), (0, 1), (1, 1), (1, 2), (1, 3), (0, 4), (1, 4), (2, 4)]
        );

        m.clear();
        m.number(0, 0, 8, RED).unwrap();
        assert_eq!(lit(&m).len(), 13);

        assert!(matches!(
            m.number(0, 0, 10, RED),
            Err(Error::InvalidDigit(10))
        ));
    }

    #[test]
    fn test_number_clipped() {
        let mut m = matrix(2, 2);
        m.number(-1, -1, 0, RED).unwrap();
        assert_eq!(lit(&m), vec![(1, 0), (1, 1)]);
    }

    #[test]
    fn test_send_data_slices_columns() {
        let device = SimDevice::new("BS000001-2.0", 0);
        let backend = SimBackend::new().with_device(device.clone());
        let info = device.info();
        let mut stick = BlinkStick::<SimTransport>::new(info.clone(), backend.open(&info).unwrap());

        let mut m = ProMatrix::new([2, 2, 0], [2, 2, 0], Duration::ZERO, 255).unwrap();
        m.set_color(1, 1, RED, false);
        m.set_color(2, 0, Rgb::new(0, 0, 255), false);
        m.send_data_all(&mut stick).unwrap();

        // channel 0 holds columns 0..2: (1,1) is LED 3
        assert_eq!(device.led(0, 3), RED);
        // channel 1 holds columns 2..4: (2,0) is LED 0
        assert_eq!(device.led(1, 0), Rgb::new(0, 0, 255));
        assert_eq!(device.sent_reports().len(), 2);
    }
}
