//! Transport abstraction.
//!
//! A [`Backend`] enumerates attached devices and opens them; the resulting
//! [`Transport`] moves HID feature reports. The hidapi backend is used for
//! real hardware, the simulator in [`crate::sim`] for tests.

mod hid;

pub use hid::{HidBackend, HidTransport};

use tracing::{debug, info};

use crate::{Error, Result};

/// Identity of an attached device, captured at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceInfo {
    /// Platform specific device path.
    pub path: String,
    /// Serial string, e.g. `BS000001-3.0`.
    pub serial: String,
    /// Manufacturer string.
    pub manufacturer: String,
    /// Product string.
    pub description: String,
    /// USB release number (bcdDevice).
    pub version_attribute: u16,
}

/// Moves feature reports to and from one device.
pub trait Transport {
    /// Sends a feature report; `data[0]` is the report ID.
    fn send_feature_report(&mut self, data: &[u8]) -> Result<()>;

    /// Reads up to `len` bytes of a feature report, report ID included.
    fn get_feature_report(&mut self, report_id: u8, len: usize) -> Result<Vec<u8>>;
}

/// Enumerates and opens devices.
pub trait Backend {
    type Transport: Transport;

    /// Lists every attached BlinkStick.
    fn enumerate(&self) -> Result<Vec<DeviceInfo>>;

    /// Opens a device returned by [`Backend::enumerate`].
    fn open(&self, info: &DeviceInfo) -> Result<Self::Transport>;
}

/// Enumerates `backend` again and opens the device with `serial`, if it is
/// still attached.
pub(crate) fn reopen_by_serial<B: Backend>(
    backend: &B,
    serial: &str,
) -> Result<Option<B::Transport>> {
    match backend.enumerate()?.into_iter().find(|d| d.serial == serial) {
        Some(info) => backend.open(&info).map(Some),
        None => Ok(None),
    }
}

/// Runs `op` on `handle`. On failure the device is looked up again by
/// `serial`, `handle` is replaced by the reopened one and `op` runs once
/// more. A device that cannot be found again gives
/// [`Error::Disconnected`]; a second failure is returned as is.
pub(crate) fn with_reconnect<H, R>(
    serial: &str,
    handle: &mut H,
    reopen: impl FnOnce(&str) -> Result<Option<H>>,
    mut op: impl FnMut(&mut H) -> Result<R>,
) -> Result<R> {
    let err = match op(handle) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    if serial.is_empty() {
        return Err(err);
    }

    debug!("Transfer to {} failed: {}, reconnecting", serial, err);
    match reopen(serial) {
        Ok(Some(fresh)) => {
            *handle = fresh;
            info!("Reconnected to BlinkStick {}", serial);
            op(handle)
        }
        Ok(None) => Err(Error::Disconnected(serial.to_string())),
        Err(e) => {
            debug!("Reopening {} failed: {}", serial, e);
            Err(Error::Disconnected(serial.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> Error {
        Error::Hid(hidapi::HidError::HidApiError {
            message: "broken pipe".to_string(),
        })
    }

    #[test]
    fn test_first_attempt_success_does_not_reopen() {
        let mut handle = 1;
        let result = with_reconnect(
            "BS000001-1.0",
            &mut handle,
            |_| panic!("reopened a working device"),
            |h| Ok(*h * 10),
        );
        assert_eq!(result.unwrap(), 10);
    }

    #[test]
    fn test_second_attempt_uses_reopened_handle() {
        let mut handle = 1;
        let mut seen = Vec::new();
        let result = with_reconnect(
            "BS000001-1.0",
            &mut handle,
            |serial| {
                assert_eq!(serial, "BS000001-1.0");
                Ok(Some(2))
            },
            |h| {
                seen.push(*h);
                if *h == 1 {
                    Err(failure())
                } else {
                    Ok(*h)
                }
            },
        );
        assert_eq!(result.unwrap(), 2);
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(handle, 2);
    }

    #[test]
    fn test_retries_exactly_once() {
        let mut handle = 1;
        let mut attempts = 0;
        let result: Result<()> = with_reconnect(
            "BS000001-1.0",
            &mut handle,
            |_| Ok(Some(2)),
            |_| {
                attempts += 1;
                Err(failure())
            },
        );
        assert_eq!(attempts, 2);
        assert!(matches!(result, Err(Error::Hid(_))));
    }

    #[test]
    fn test_missing_serial_is_disconnected() {
        let mut handle = 1;
        let result: Result<()> =
            with_reconnect("BS000001-1.0", &mut handle, |_| Ok(None), |_| Err(failure()));
        assert!(matches!(result, Err(Error::Disconnected(ref s)) if s == "BS000001-1.0"));
        assert_eq!(handle, 1);
    }

    #[test]
    fn test_failed_reopen_is_disconnected() {
        let mut handle = 1;
        let result: Result<()> = with_reconnect(
            "BS000001-1.0",
            &mut handle,
            |_| Err(failure()),
            |_| Err(failure()),
        );
        assert!(matches!(result, Err(Error::Disconnected(_))));
    }

    #[test]
    fn test_no_serial_keeps_original_error() {
        let mut handle = 1;
        let result: Result<()> =
            with_reconnect("", &mut handle, |_| panic!("no serial to look up"), |_| Err(failure()));
        assert!(matches!(result, Err(Error::Hid(_))));
    }
}
