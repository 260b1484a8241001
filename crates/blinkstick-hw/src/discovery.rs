//! Finding attached BlinkSticks.
//!
//! The plain functions use hidapi; the `*_in` variants take any [`Backend`].

use tracing::{debug, warn};

use crate::device::BlinkStick;
use crate::transport::{Backend, HidBackend, HidTransport};
use crate::Result;

/// Opens every BlinkStick attached to the system.
pub fn find_all() -> Result<Vec<BlinkStick<HidTransport>>> {
    find_all_in(&HidBackend::new()?)
}

/// Opens the first BlinkStick found, if any.
pub fn find_first() -> Result<Option<BlinkStick<HidTransport>>> {
    find_first_in(&HidBackend::new()?)
}

/// Opens the BlinkStick with the given serial, if attached.
pub fn find_by_serial(serial: &str) -> Result<Option<BlinkStick<HidTransport>>> {
    find_by_serial_in(&HidBackend::new()?, serial)
}

/// Opens every device the backend enumerates. Devices that cannot be opened
/// are skipped.
pub fn find_all_in<B: Backend>(backend: &B) -> Result<Vec<BlinkStick<B::Transport>>> {
    let mut sticks = Vec::new();
    for info in backend.enumerate()? {
        match backend.open(&info) {
            Ok(transport) => sticks.push(BlinkStick::new(info, transport)),
            Err(e) => warn!("Skipping BlinkStick {} ({}): {}", info.serial, info.path, e),
        }
    }
    debug!("Found {} BlinkStick(s)", sticks.len());
    Ok(sticks)
}

pub fn find_first_in<B: Backend>(backend: &B) -> Result<Option<BlinkStick<B::Transport>>> {
    let Some(info) = backend.enumerate()?.into_iter().next() else {
        return Ok(None);
    };
    let transport = backend.open(&info)?;
    Ok(Some(BlinkStick::new(info, transport)))
}

pub fn find_by_serial_in<B: Backend>(
    backend: &B,
    serial: &str,
) -> Result<Option<BlinkStick<B::Transport>>> {
    let Some(info) = backend
        .enumerate()?
        .into_iter()
        .find(|d| d.serial == serial)
    else {
        debug!("No BlinkStick with serial {}", serial);
        return Ok(None);
    };
    let transport = backend.open(&info)?;
    Ok(Some(BlinkStick::new(info, transport)))
}
