//! USB HID backend built on hidapi.

use std::ffi::CString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hidapi::{HidApi, HidDevice};
use tracing::{debug, info};

use super::{reopen_by_serial, with_reconnect, Backend, DeviceInfo, Transport};
use crate::{Error, Result, PRODUCT_ID, VENDOR_ID};

/// hidapi context shared by every device opened through it.
#[derive(Clone)]
pub struct HidBackend {
    api: Arc<Mutex<HidApi>>,
}

impl HidBackend {
    /// Initialises hidapi.
    pub fn new() -> Result<Self> {
        Ok(Self {
            api: Arc::new(Mutex::new(HidApi::new()?)),
        })
    }

    fn api(&self) -> MutexGuard<'_, HidApi> {
        self.api.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for HidBackend {
    type Transport = HidTransport;

    fn enumerate(&self) -> Result<Vec<DeviceInfo>> {
        let mut api = self.api();
        api.refresh_devices()?;

        let devices: Vec<DeviceInfo> = api
            .device_list()
            .filter(|d| d.vendor_id() == VENDOR_ID && d.product_id() == PRODUCT_ID)
            .map(|d| DeviceInfo {
                path: d.path().to_string_lossy().into_owned(),
                serial: d.serial_number().unwrap_or_default().to_string(),
                manufacturer: d.manufacturer_string().unwrap_or_default().to_string(),
                description: d.product_string().unwrap_or_default().to_string(),
                version_attribute: d.release_number(),
            })
            .collect();

        for dev in &devices {
            debug!(
                "Found BlinkStick: serial={}, path={}, release={:#06x}",
                dev.serial, dev.path, dev.version_attribute
            );
        }

        Ok(devices)
    }

    fn open(&self, info: &DeviceInfo) -> Result<HidTransport> {
        let device = open_path(&self.api(), &info.path)?;

        info!(
            "BlinkStick {} opened (VID:{:04X} PID:{:04X})",
            info.serial, VENDOR_ID, PRODUCT_ID
        );

        Ok(HidTransport {
            backend: self.clone(),
            serial: info.serial.clone(),
            device,
        })
    }
}

fn open_path(api: &HidApi, path: &str) -> Result<HidDevice> {
    let c_path = CString::new(path).map_err(|_| Error::InvalidPath(path.to_string()))?;
    Ok(api.open_path(&c_path)?)
}

/// An open BlinkStick.
///
/// When a transfer fails the device is looked up again by serial and the
/// transfer retried once, which survives re-plugging and USB resets.
pub struct HidTransport {
    backend: HidBackend,
    serial: String,
    device: HidDevice,
}

impl HidTransport {
    /// Serial of the device this transport talks to.
    pub fn serial(&self) -> &str {
        &self.serial
    }
}

fn reopen_device(backend: &HidBackend, serial: &str) -> Result<Option<HidDevice>> {
    Ok(reopen_by_serial(backend, serial)?.map(|transport| transport.device))
}

impl Transport for HidTransport {
    fn send_feature_report(&mut self, data: &[u8]) -> Result<()> {
        debug!("Sending report to {}: {:02X?}", self.serial, data);
        let backend = &self.backend;
        with_reconnect(
            &self.serial,
            &mut self.device,
            |serial| reopen_device(backend, serial),
            |device| Ok(device.send_feature_report(data)?),
        )
    }

    fn get_feature_report(&mut self, report_id: u8, len: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; len.max(1)];
        let backend = &self.backend;
        let read = with_reconnect(
            &self.serial,
            &mut self.device,
            |serial| reopen_device(backend, serial),
            |device| {
                buffer[0] = report_id;
                Ok(device.get_feature_report(&mut buffer)?)
            },
        )?;
        buffer.truncate(read);
        debug!("Read report 0x{:02X} from {}: {:02X?}", report_id, self.serial, buffer);
        Ok(buffer)
    }
}
