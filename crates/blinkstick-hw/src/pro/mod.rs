//! Frame buffers for LED chains on a BlinkStick Pro.
//!
//! The Pro drives up to three chains of WS2812 LEDs, one per output pin
//! (R=0, G=1, B=2). Colours are collected in memory and pushed to the
//! device one channel at a time.

mod matrix;
mod strip;

pub use matrix::ProMatrix;
pub use strip::ProStrip;

/// Number of output channels on a Pro.
pub const CHANNELS: usize = 3;
