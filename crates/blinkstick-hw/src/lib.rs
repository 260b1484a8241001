//! BlinkStick Hardware Library
//!
//! Provides discovery and control of BlinkStick USB LED controllers
//! (BlinkStick, Pro, Strip, Square, Nano and Flex) over USB HID feature
//! reports, plus frame buffers for individually addressable LEDs.

pub mod color;
pub mod device;
pub mod discovery;
pub mod effects;
pub mod error;
pub mod info_block;
pub mod pro;
pub mod protocol;
pub mod sim;
pub mod transport;
pub mod variant;

pub use color::{ColorFormat, ColorSpec, Rgb};
pub use device::{BlinkStick, LedAddress};
pub use discovery::{find_all, find_by_serial, find_first};
pub use error::{Error, Result};
pub use info_block::InfoBlock;
pub use pro::{ProMatrix, ProStrip};
pub use protocol::Mode;
pub use transport::{Backend, DeviceInfo, HidBackend, HidTransport, Transport};
pub use variant::Variant;

/// USB VID:PID shared by every BlinkStick model.
pub const VENDOR_ID: u16 = 0x20A0;
pub const PRODUCT_ID: u16 = 0x41E5;
