//! In-memory BlinkStick for tests.
//!
//! [`SimDevice`] emulates the firmware side of every feature report: LED
//! memory for three channels of 64 LEDs (GRB), both info blocks, the mode
//! and the LED count. Handles are cheap clones sharing one state, so a test
//! can keep a handle while a [`crate::BlinkStick`] owns the transport.
//!
//! Transfers to an unplugged device fail like USB I/O errors, and a
//! [`SimTransport`] then reconnects by serial the same way the hidapi
//! transport does.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::info_block::INFO_BLOCK_SIZE;
use crate::protocol::{
    MAX_LEDS, REPORT_COLOR, REPORT_INDEXED_COLOR, REPORT_LED_COUNT, REPORT_MODE,
};
use crate::transport::{reopen_by_serial, with_reconnect, Backend, DeviceInfo, Transport};
use crate::{Error, Result, Rgb};

const CHANNELS: usize = 3;

struct SimState {
    info: DeviceInfo,
    plugged: bool,
    leds: [[u8; MAX_LEDS * 3]; CHANNELS],
    info_blocks: [[u8; INFO_BLOCK_SIZE]; 2],
    mode: u8,
    led_count: u8,
    last_channel: u8,
    sent: Vec<Vec<u8>>,
    failures: u32,
    opens: u32,
}

impl SimState {
    fn check_link(&mut self) -> Result<()> {
        if !self.plugged {
            return Err(io_error("device not connected"));
        }
        if self.failures > 0 {
            self.failures -= 1;
            return Err(io_error("transfer failed"));
        }
        Ok(())
    }

    fn set_feature(&mut self, data: &[u8]) -> Result<()> {
        let report_id = data.first().copied().unwrap_or_default();
        match (report_id, data) {
            (REPORT_COLOR, [_, r, g, b, ..]) => {
                self.leds[0][..3].copy_from_slice(&Rgb::new(*r, *g, *b).to_grb());
            }
            (0x02 | 0x03, [_, rest @ ..]) => {
                let block = &mut self.info_blocks[report_id as usize - 2];
                let len = rest.len().min(INFO_BLOCK_SIZE);
                block.fill(0);
                block[..len].copy_from_slice(&rest[..len]);
            }
            (REPORT_MODE, [_, mode, ..]) => self.mode = *mode,
            (REPORT_INDEXED_COLOR, [_, channel, index, r, g, b, ..]) => {
                let (channel, index) = (*channel as usize, *index as usize);
                if channel >= CHANNELS || index >= MAX_LEDS {
                    return Err(stall(report_id));
                }
                let offset = index * 3;
                self.leds[channel][offset..offset + 3]
                    .copy_from_slice(&Rgb::new(*r, *g, *b).to_grb());
                self.last_channel = channel as u8;
            }
            (0x06..=0x09, [_, channel, grb @ ..]) => {
                let channel = *channel as usize;
                if channel >= CHANNELS {
                    return Err(stall(report_id));
                }
                let len = grb.len().min(MAX_LEDS * 3);
                self.leds[channel][..len].copy_from_slice(&grb[..len]);
                self.last_channel = channel as u8;
            }
            (REPORT_LED_COUNT, [_, count, ..]) => self.led_count = *count,
            _ => return Err(stall(report_id)),
        }
        Ok(())
    }

    fn get_feature(&self, report_id: u8, len: usize) -> Result<Vec<u8>> {
        let mut reply = vec![report_id];
        match report_id {
            REPORT_COLOR => {
                let rgb = Rgb::from_grb([self.leds[0][0], self.leds[0][1], self.leds[0][2]]);
                reply.extend_from_slice(&[rgb.r, rgb.g, rgb.b]);
                reply.resize(33, 0);
            }
            0x02 | 0x03 => reply.extend_from_slice(&self.info_blocks[report_id as usize - 2]),
            REPORT_MODE => reply.push(self.mode),
            REPORT_LED_COUNT => reply.push(self.led_count),
            0x06..=0x09 => {
                let capacity = [8, 16, 32, 64][report_id as usize - 0x06];
                reply.push(self.last_channel);
                reply.extend_from_slice(&self.leds[self.last_channel as usize][..capacity * 3]);
            }
            _ => return Err(stall(report_id)),
        }
        reply.truncate(len);
        Ok(reply)
    }
}

fn stall(report_id: u8) -> Error {
    io_error(&format!("report 0x{report_id:02X} rejected by device"))
}

fn io_error(message: &str) -> Error {
    Error::Hid(hidapi::HidError::HidApiError {
        message: message.to_string(),
    })
}

/// Shared handle to one simulated device.
#[derive(Clone)]
pub struct SimDevice {
    state: Arc<Mutex<SimState>>,
}

impl SimDevice {
    /// Creates a plugged-in device with the given serial and release number.
    pub fn new(serial: &str, version_attribute: u16) -> Self {
        let info = DeviceInfo {
            path: format!("sim://{serial}"),
            serial: serial.to_string(),
            manufacturer: "Agile Innovative Ltd".to_string(),
            description: "BlinkStick".to_string(),
            version_attribute,
        };
        Self {
            state: Arc::new(Mutex::new(SimState {
                info,
                plugged: true,
                leds: [[0; MAX_LEDS * 3]; CHANNELS],
                info_blocks: [[0; INFO_BLOCK_SIZE]; 2],
                mode: 0,
                led_count: 1,
                last_channel: 0,
                sent: Vec::new(),
                failures: 0,
                opens: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enumeration data of this device.
    pub fn info(&self) -> DeviceInfo {
        self.state().info.clone()
    }

    /// Makes the next `count` transfers fail while the device stays
    /// attached.
    pub fn fail_transfers(&self, count: u32) {
        self.state().failures = count;
    }

    /// Injected failures not yet consumed by a transfer.
    pub fn pending_failures(&self) -> u32 {
        self.state().failures
    }

    /// How many times a backend opened this device.
    pub fn open_count(&self) -> u32 {
        self.state().opens
    }

    /// Detaches the device: it disappears from enumeration and every
    /// transfer fails until [`SimDevice::plug`] is called.
    pub fn unplug(&self) {
        self.state().plugged = false;
    }

    /// Reattaches the device.
    pub fn plug(&self) {
        self.state().plugged = true;
    }

    /// Colour stored for one LED.
    pub fn led(&self, channel: usize, index: usize) -> Rgb {
        let state = self.state();
        let offset = index * 3;
        let grb = &state.leds[channel][offset..offset + 3];
        Rgb::from_grb([grb[0], grb[1], grb[2]])
    }

    /// Current mode byte.
    pub fn mode(&self) -> u8 {
        self.state().mode
    }

    /// Current LED count.
    pub fn led_count(&self) -> u8 {
        self.state().led_count
    }

    /// Every report sent so far, oldest first.
    pub fn sent_reports(&self) -> Vec<Vec<u8>> {
        self.state().sent.clone()
    }

    /// Forgets the recorded reports.
    pub fn clear_sent_reports(&self) {
        self.state().sent.clear();
    }
}

/// Transport talking to a [`SimDevice`].
pub struct SimTransport {
    backend: SimBackend,
    serial: String,
    device: SimDevice,
}

impl Transport for SimTransport {
    fn send_feature_report(&mut self, data: &[u8]) -> Result<()> {
        let backend = &self.backend;
        with_reconnect(
            &self.serial,
            &mut self.device,
            |serial| reopen_device(backend, serial),
            |device| {
                let mut state = device.state();
                state.check_link()?;
                state.sent.push(data.to_vec());
                state.set_feature(data)
            },
        )
    }

    fn get_feature_report(&mut self, report_id: u8, len: usize) -> Result<Vec<u8>> {
        let backend = &self.backend;
        with_reconnect(
            &self.serial,
            &mut self.device,
            |serial| reopen_device(backend, serial),
            |device| {
                let mut state = device.state();
                state.check_link()?;
                state.get_feature(report_id, len)
            },
        )
    }
}

fn reopen_device(backend: &SimBackend, serial: &str) -> Result<Option<SimDevice>> {
    Ok(reopen_by_serial(backend, serial)?.map(|transport| transport.device))
}

/// Backend enumerating a fixed set of simulated devices.
#[derive(Clone, Default)]
pub struct SimBackend {
    devices: Vec<SimDevice>,
}

impl SimBackend {
    /// Creates a backend with no devices attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a device.
    pub fn with_device(mut self, device: SimDevice) -> Self {
        self.devices.push(device);
        self
    }

    /// Attached device handles.
    pub fn devices(&self) -> &[SimDevice] {
        &self.devices
    }
}

impl Backend for SimBackend {
    type Transport = SimTransport;

    fn enumerate(&self) -> Result<Vec<DeviceInfo>> {
        Ok(self
            .devices
            .iter()
            .filter(|d| d.state().plugged)
            .map(SimDevice::info)
            .collect())
    }

    fn open(&self, info: &DeviceInfo) -> Result<SimTransport> {
        let device = self
            .devices
            .iter()
            .find(|d| d.state().info.path == info.path)
            .filter(|d| d.state().plugged)
            .ok_or_else(|| Error::Disconnected(info.serial.clone()))?;
        device.state().opens += 1;
        Ok(SimTransport {
            backend: self.clone(),
            serial: info.serial.clone(),
            device: device.clone(),
        })
    }
}
